//! Configuration for session finalization

use crate::domain::diagnostics::DIAGNOSTIC_FILENAME;
use serde::{Deserialize, Serialize};

/// Storage keys and file names used by the finalizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalizerConfig {
    /// Session variable holding the persisted message list
    pub session_messages_key: String,
    /// Field of the synthetic interaction-event record
    pub interaction_field: String,
    /// Result file name of the diagnostic log
    pub diagnostic_filename: String,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            session_messages_key: "otpSessionMessages".to_string(),
            interaction_field: "interactionData".to_string(),
            diagnostic_filename: DIAGNOSTIC_FILENAME.to_string(),
        }
    }
}
