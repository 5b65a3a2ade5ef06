//! Key material as seen by the queue.
//!
//! The bytes are provider-specific; the queue only stores and hands them back.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Loaded public key, ready for encryption.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial(Vec<u8>);

impl PublicKeyMaterial {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PublicKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyMaterial({} bytes)", self.0.len())
    }
}

/// Loaded private key. Wiped on drop, never printed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyMaterial(Vec<u8>);

impl PrivateKeyMaterial {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyMaterial(..)")
    }
}

/// User id and options for key generation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyPairOptions {
    pub email: Option<String>,
    pub comment: Option<String>,
    /// Locks the generated private key
    pub passphrase: Option<String>,
}

impl KeyPairOptions {
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }
}

impl fmt::Debug for KeyPairOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPairOptions")
            .field("email", &self.email)
            .field("comment", &self.comment)
            .field("passphrase", &self.passphrase.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Freshly generated armored keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedKeyPair {
    pub public_key_armored: String,
    pub private_key_armored: String,
}
