//! Error types for session finalization

use ss_02_encryption_queue::EncryptionError;
use thiserror::Error;

/// Failure reported by a platform transmit or lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Platform answered with an error
    #[error("Platform rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    /// Platform could not be reached
    #[error("Platform unavailable: {0}")]
    Unavailable(String),
}

/// Result type for platform calls
pub type TransportResult<T> = Result<T, TransportError>;

/// Session finalizer errors
#[derive(Debug, Error)]
pub enum FinalizerError {
    /// Drain reported a failed encryption; payload not sent
    #[error("Pending encryption failed: {0}")]
    Encryption(#[from] EncryptionError),

    /// Transmit or terminal call failed; no transition recorded
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Custom component order in effect, but continue is not plain advance
    #[error("Continue must be true (advance) when a custom component order is in use, got {requested}")]
    OrderOverride { requested: String },

    /// Collected trial data could not be serialized
    #[error("Failed to serialize trial data: {0}")]
    Serialization(String),

    /// Before-finish hook failed
    #[error("Before-finish hook failed: {0}")]
    Hook(String),
}

/// Result type for finalizer operations
pub type FinalizerResult<T> = Result<T, FinalizerError>;
