//! Plaintext conversion before encryption.

use serde_json::Value;

/// Strings are encrypted verbatim; every other value as its JSON text.
pub fn to_plaintext(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
