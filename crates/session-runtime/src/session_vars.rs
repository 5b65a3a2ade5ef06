//! Layered session variables.
//!
//! Reads fall back from session data to the component's JSON input, then the
//! study's JSON input, then the caller's default. Writes go to session data.

use serde_json::Value;
use shared_types::SessionStore;
use ss_01_component_order::RosterProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionVars {
    session: Arc<dyn SessionStore>,
    platform: Arc<dyn RosterProvider>,
}

impl SessionVars {
    pub fn new(session: Arc<dyn SessionStore>, platform: Arc<dyn RosterProvider>) -> Self {
        Self { session, platform }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.session
            .get_var(key)
            .or_else(|| lookup(&self.platform.component_config(), key))
            .or_else(|| lookup(&self.platform.study_config(), key))
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&self, key: &str, value: Value) {
        self.session.set_var(key, value);
    }
}

fn lookup(input: &Value, key: &str) -> Option<Value> {
    input.get(key).cloned()
}
