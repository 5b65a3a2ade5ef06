//! Terminal transition chosen by study authors.
//!
//! Raw option values are decoded once, here:
//!
//! | Raw value                       | Action              |
//! |---------------------------------|---------------------|
//! | `false`, `null`, `""`, `0`      | `Skip`              |
//! | `"end"`                         | `EndSession`        |
//! | `"endOnly"`                     | `EndOnly`           |
//! | string starting with `http`     | `RedirectTo(url)`   |
//! | `true`                          | `AdvanceDefault`    |
//! | `{"component": 3 \| "name"}`    | `JumpToComponent`   |
//! | `{"pos": 2}`                    | `JumpToPosition`    |
//! | anything else                   | `Unrecognized(raw)` |

use crate::error::{FinalizerError, FinalizerResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::ComponentId;
use ss_01_component_order::ResolvedNext;
use std::fmt;

/// What happens after the component's data is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ContinueAction {
    /// Next component in the platform's own order
    #[default]
    AdvanceDefault,
    /// End the session, with platform callback
    EndSession,
    /// End the session without platform callback
    EndOnly,
    /// End the session and redirect to this URL
    RedirectTo(String),
    JumpToComponent(ComponentId),
    JumpToPosition(u32),
    /// No transition
    Skip,
    /// Value that matches no known form
    Unrecognized(Value),
}

impl ContinueAction {
    /// Decode a raw option value.
    pub fn from_value(raw: &Value) -> Self {
        if !is_truthy(raw) {
            return ContinueAction::Skip;
        }
        match raw {
            Value::String(s) if s == "end" => ContinueAction::EndSession,
            Value::String(s) if s == "endOnly" => ContinueAction::EndOnly,
            Value::String(s) if is_url(s) => ContinueAction::RedirectTo(s.clone()),
            Value::Bool(true) => ContinueAction::AdvanceDefault,
            Value::Object(target) => {
                match (target.get("component"), target.get("pos")) {
                    (Some(Value::Number(n)), _) if n.is_i64() => {
                        ContinueAction::JumpToComponent(ComponentId::Numeric(n.as_i64().unwrap_or_default()))
                    }
                    (Some(Value::String(id)), _) => {
                        ContinueAction::JumpToComponent(ComponentId::Named(id.clone()))
                    }
                    (_, Some(Value::Number(n))) => n
                        .as_u64()
                        .and_then(|pos| u32::try_from(pos).ok())
                        .map(ContinueAction::JumpToPosition)
                        .unwrap_or_else(|| ContinueAction::Unrecognized(raw.clone())),
                    _ => ContinueAction::Unrecognized(raw.clone()),
                }
            }
            _ => ContinueAction::Unrecognized(raw.clone()),
        }
    }

    /// Raw form of this action.
    pub fn to_value(&self) -> Value {
        match self {
            ContinueAction::AdvanceDefault => Value::Bool(true),
            ContinueAction::EndSession => json!("end"),
            ContinueAction::EndOnly => json!("endOnly"),
            ContinueAction::RedirectTo(url) => json!(url),
            ContinueAction::JumpToComponent(id) => json!({ "component": id }),
            ContinueAction::JumpToPosition(pos) => json!({ "pos": pos }),
            ContinueAction::Skip => Value::Bool(false),
            ContinueAction::Unrecognized(raw) => raw.clone(),
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, ContinueAction::Skip)
    }

    /// Apply a resolved custom order.
    ///
    /// With a custom order in effect only `AdvanceDefault` is accepted; it
    /// becomes a jump to the resolved component, or the end of the session.
    pub fn apply_order(self, resolved: &ResolvedNext) -> FinalizerResult<Self> {
        match (resolved, self) {
            (ResolvedNext::Absent, action) => Ok(action),
            (ResolvedNext::Component(id), ContinueAction::AdvanceDefault) => {
                Ok(ContinueAction::JumpToComponent(id.clone()))
            }
            (ResolvedNext::End, ContinueAction::AdvanceDefault) => Ok(ContinueAction::EndSession),
            (_, other) => Err(FinalizerError::OrderOverride {
                requested: other.to_string(),
            }),
        }
    }
}

impl From<Value> for ContinueAction {
    fn from(raw: Value) -> Self {
        ContinueAction::from_value(&raw)
    }
}

impl From<ContinueAction> for Value {
    fn from(action: ContinueAction) -> Self {
        action.to_value()
    }
}

impl fmt::Display for ContinueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// Loose truthiness of option values.
pub(crate) fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_url(s: &str) -> bool {
    s.get(..4)
        .map(|scheme| scheme.eq_ignore_ascii_case("http"))
        .unwrap_or(false)
}
