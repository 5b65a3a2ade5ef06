//! Error types for the encryption queue

use shared_crypto::CryptoError;
use thiserror::Error;

/// Encryption queue errors
///
/// `Clone` because a settled task's outcome is observed both by the caller
/// holding its handle and by the drain barrier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncryptionError {
    /// Encrypt requested before a public key was loaded
    #[error("Can't encrypt: public key has not been loaded")]
    Unavailable,

    /// Decrypt requested before a private key was loaded
    #[error("Can't decrypt: private key has not been loaded")]
    PrivateKeyUnavailable,

    /// Armored key text of the wrong kind or unparseable
    #[error("Key is not in correct format: {0}")]
    InvalidKeyFormat(String),

    /// Private key is protected and the passphrase is missing or wrong
    #[error("Can't unlock private key: {0}")]
    Passphrase(String),

    /// Provider failed to encrypt, decrypt or generate
    #[error("Crypto provider error: {0}")]
    Provider(String),

    /// Spawned encryption task did not run to completion
    #[error("Encryption task failed: {0}")]
    TaskFailed(String),
}

impl From<CryptoError> for EncryptionError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidArmor(_)
            | CryptoError::UnexpectedArmor { .. }
            | CryptoError::InvalidPublicKey
            | CryptoError::InvalidPrivateKey => EncryptionError::InvalidKeyFormat(err.to_string()),
            CryptoError::PassphraseRequired | CryptoError::WrongPassphrase => {
                EncryptionError::Passphrase(err.to_string())
            }
            other => EncryptionError::Provider(other.to_string()),
        }
    }
}

/// Result type for encryption operations
pub type EncryptionResult<T> = Result<T, EncryptionError>;
