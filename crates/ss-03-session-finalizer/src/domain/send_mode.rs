//! How collected data is handed to the platform.

use super::continue_action::is_truthy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Transmission mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum SendMode {
    /// Do not transmit
    Skip,
    /// Replace the component's result data; marks the session as fully sent
    #[default]
    SubmitOnce,
    /// Append to the component's result data
    Append,
    /// Value that matches no known form
    Unrecognized(Value),
}

impl SendMode {
    /// Decode a raw option value: falsy, `true` or `"append"`.
    pub fn from_value(raw: &Value) -> Self {
        match raw {
            _ if !is_truthy(raw) => SendMode::Skip,
            Value::Bool(true) => SendMode::SubmitOnce,
            Value::String(s) if s == "append" => SendMode::Append,
            other => SendMode::Unrecognized(other.clone()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SendMode::Skip => Value::Bool(false),
            SendMode::SubmitOnce => Value::Bool(true),
            SendMode::Append => json!("append"),
            SendMode::Unrecognized(raw) => raw.clone(),
        }
    }
}

impl From<Value> for SendMode {
    fn from(raw: Value) -> Self {
        SendMode::from_value(&raw)
    }
}

impl From<SendMode> for Value {
    fn from(mode: SendMode) -> Self {
        mode.to_value()
    }
}
