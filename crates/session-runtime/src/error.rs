//! Runtime errors

use ss_01_component_order::ConfigError;
use ss_02_encryption_queue::EncryptionError;
use ss_03_session_finalizer::{FinalizerError, TransportError};
use thiserror::Error;

/// Errors surfaced by session bootstrap, trial finishing and configuration.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Order(#[from] ConfigError),

    #[error("Encryption failed: {0}")]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Finalizer(#[from] FinalizerError),

    #[error("Platform call failed: {0}")]
    Transport(#[from] TransportError),

    /// Encryption was requested for a record without a usable `trial_index`
    #[error("Trial record has no trial_index, cannot encrypt it")]
    MissingTrialIndex,

    #[error("Invalid setting {name}={value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Failed to read {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
