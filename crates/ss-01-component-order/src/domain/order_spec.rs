//! Declarative custom order, as written by study authors.
//!
//! ```json
//! "otputil_order": {
//!   "order": { "A": ["intro", "task", "outro"], "B": ["intro", "outro", "task"] },
//!   "uuid":  { "intro": "5c1e...", "task": "a0f2...", "outro": "77d9..." }
//! }
//! ```
//!
//! Orderings keep their declaration order so "the first declared ordering" is
//! well defined. Entry-level typing is checked lazily: a malformed ordering is
//! only an error once it is selected, and a non-string uuid binding behaves as
//! if it were absent.

use super::errors::{ConfigError, OrderResult};
use serde_json::Value;
use std::collections::HashMap;

/// One named ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedOrdering {
    pub code: String,
    /// `None` when the declared value is not a list of ids.
    pub entries: Option<Vec<String>>,
}

/// Parsed order specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    orderings: Vec<NamedOrdering>,
    uuid_of: HashMap<String, String>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an ordering (builder style).
    pub fn with_ordering<I, S>(mut self, code: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orderings.push(NamedOrdering {
            code: code.into(),
            entries: Some(ids.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Bind a local id to a component uuid (builder style).
    pub fn with_uuid(mut self, local_id: impl Into<String>, uuid: impl Into<String>) -> Self {
        self.uuid_of.insert(local_id.into(), uuid.into());
        self
    }

    /// Extract the spec stored under `key` in the study configuration.
    ///
    /// Returns `Ok(None)` when no custom order is declared. Once the key holds
    /// an object, missing `order`/`uuid` maps are errors.
    pub fn from_study_config(config: &Value, key: &str) -> OrderResult<Option<Self>> {
        let Some(raw) = config.get(key).and_then(Value::as_object) else {
            return Ok(None);
        };

        let order = raw
            .get("order")
            .and_then(Value::as_object)
            .ok_or(ConfigError::MissingOrderings)?;
        let uuid = raw
            .get("uuid")
            .and_then(Value::as_object)
            .ok_or(ConfigError::MissingUuidMap)?;

        let orderings = order
            .iter()
            .map(|(code, ids)| NamedOrdering {
                code: code.clone(),
                entries: parse_entries(ids),
            })
            .collect();

        let uuid_of = uuid
            .iter()
            .filter_map(|(local_id, v)| v.as_str().map(|u| (local_id.clone(), u.to_string())))
            .collect();

        Ok(Some(Self { orderings, uuid_of }))
    }

    /// Code of the first declared ordering.
    pub fn first_code(&self) -> Option<&str> {
        self.orderings.first().map(|o| o.code.as_str())
    }

    /// Entries of the ordering named `code`.
    pub fn ordering(&self, code: &str) -> OrderResult<&[String]> {
        let named = self
            .orderings
            .iter()
            .find(|o| o.code == code)
            .ok_or_else(|| ConfigError::UnknownOrder {
                code: code.to_string(),
            })?;

        named
            .entries
            .as_deref()
            .ok_or_else(|| ConfigError::MalformedOrder {
                code: code.to_string(),
            })
    }

    /// Uuid bound to `local_id`.
    pub fn uuid_of(&self, local_id: &str) -> Option<&str> {
        self.uuid_of.get(local_id).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.orderings.iter().map(|o| o.code.as_str())
    }
}

// Numeric ids are accepted and compared by their decimal form.
fn parse_entries(ids: &Value) -> Option<Vec<String>> {
    ids.as_array()?
        .iter()
        .map(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}
