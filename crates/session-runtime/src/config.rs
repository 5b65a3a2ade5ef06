//! # Session Configuration
//!
//! Runtime settings for one component session, with environment overrides:
//!
//! | Variable | Field |
//! |---|---|
//! | `SS_PUBLIC_KEY_FILE` | `public_key_armored` (file contents) |
//! | `SS_WAIT_FOR_PLATFORM` | `wait_for_platform` |
//! | `SS_LOG_LEVEL` | `log_level` |
//! | `SS_SCENARIO` | `scenario` |

use crate::error::{RuntimeError, RuntimeResult};
use serde::{Deserialize, Serialize};
use ss_01_component_order::OrderConfig;
use ss_03_session_finalizer::FinalizerConfig;

/// Complete session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Armored public key; encryption is enabled when set.
    pub public_key_armored: Option<String>,
    /// Await the platform ready signal before bootstrapping.
    pub wait_for_platform: bool,
    /// `tracing` filter directive for the binary.
    pub log_level: String,
    /// Demo scenario run by the binary.
    pub scenario: String,
    /// Environment string printed in error log entries.
    pub environment: String,
    pub order: OrderConfig,
    pub finalizer: FinalizerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            public_key_armored: None,
            wait_for_platform: true,
            log_level: "info".to_string(),
            scenario: "default".to_string(),
            environment: format!("session-runtime/{}", env!("CARGO_PKG_VERSION")),
            order: OrderConfig::default(),
            finalizer: FinalizerConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> RuntimeResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> RuntimeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("SS_PUBLIC_KEY_FILE") {
            let armored =
                std::fs::read_to_string(&path).map_err(|source| RuntimeError::KeyFile {
                    path: path.clone(),
                    source,
                })?;
            config.public_key_armored = Some(armored);
        }

        if let Some(value) = lookup("SS_WAIT_FOR_PLATFORM") {
            config.wait_for_platform = parse_flag(&value).ok_or(RuntimeError::InvalidSetting {
                name: "SS_WAIT_FOR_PLATFORM",
                value,
            })?;
        }

        if let Some(level) = lookup("SS_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(scenario) = lookup("SS_SCENARIO") {
            config.scenario = scenario;
        }

        Ok(config)
    }

    pub fn with_public_key(mut self, armored: impl Into<String>) -> Self {
        self.public_key_armored = Some(armored.into());
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.public_key_armored, None);
        assert!(config.wait_for_platform);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.order.spec_key, "otputil_order");
    }

    #[test]
    fn test_overrides() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("SS_WAIT_FOR_PLATFORM", "off"),
            ("SS_LOG_LEVEL", "debug"),
            ("SS_SCENARIO", "custom-order"),
        ]))
        .unwrap();
        assert!(!config.wait_for_platform);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scenario, "custom-order");
    }

    #[test]
    fn test_invalid_flag() {
        let result = SessionConfig::from_lookup(lookup(&[("SS_WAIT_FOR_PLATFORM", "maybe")]));
        assert!(matches!(
            result,
            Err(RuntimeError::InvalidSetting {
                name: "SS_WAIT_FOR_PLATFORM",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_key_file() {
        let result =
            SessionConfig::from_lookup(lookup(&[("SS_PUBLIC_KEY_FILE", "/nonexistent/key.asc")]));
        assert!(matches!(result, Err(RuntimeError::KeyFile { .. })));
    }

    #[test]
    fn test_partial_json() {
        let config: SessionConfig = serde_json::from_str(r#"{"scenario": "end"}"#).unwrap();
        assert_eq!(config.scenario, "end");
        assert!(config.wait_for_platform);
    }
}
