//! Outbound Ports (Driven Ports / SPI)

use crate::domain::keys::{GeneratedKeyPair, KeyPairOptions, PrivateKeyMaterial, PublicKeyMaterial};
use crate::error::EncryptionResult;
use async_trait::async_trait;

/// Opaque public-key encryption provider.
#[async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Parse an armored public key.
    fn load_public_key(&self, armored: &str) -> EncryptionResult<PublicKeyMaterial>;

    /// Parse an armored private key, unlocking it with `passphrase` when
    /// it is protected.
    fn load_private_key(
        &self,
        armored: &str,
        passphrase: Option<&str>,
    ) -> EncryptionResult<PrivateKeyMaterial>;

    /// Encrypt text, returning armored ciphertext.
    async fn encrypt(&self, plaintext: &str, key: &PublicKeyMaterial) -> EncryptionResult<String>;

    /// Decrypt armored ciphertext.
    async fn decrypt(&self, ciphertext: &str, key: &PrivateKeyMaterial)
        -> EncryptionResult<String>;

    /// Generate a key pair for the named owner.
    fn generate_key_pair(
        &self,
        name: &str,
        options: &KeyPairOptions,
    ) -> EncryptionResult<GeneratedKeyPair>;
}
