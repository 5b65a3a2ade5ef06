//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Armored text is missing its markers or has a malformed body
    #[error("Malformed armor: {0}")]
    InvalidArmor(String),

    /// Armored text carries a different block type than expected
    #[error("Expected {expected} block, found {found}")]
    UnexpectedArmor {
        /// Expected armor label
        expected: &'static str,
        /// Label actually found
        found: String,
    },

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Sealed message too short to contain its header
    #[error("Sealed message truncated: {len} bytes")]
    Truncated {
        /// Length of the received message
        len: usize,
    },

    /// Private key is passphrase-protected and no passphrase was given
    #[error("Private key is protected, passphrase required")]
    PassphraseRequired,

    /// Passphrase did not unlock the private key
    #[error("Wrong passphrase for private key")]
    WrongPassphrase,

    /// Invalid input for cryptographic operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
