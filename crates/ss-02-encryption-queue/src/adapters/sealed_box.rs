//! [`CryptoProvider`] over the shared sealed-box construction.
//!
//! Ciphertexts are armored `STUDY MESSAGE` blocks so they can be stored as
//! plain strings inside trial records.

use crate::domain::keys::{GeneratedKeyPair, KeyPairOptions, PrivateKeyMaterial, PublicKeyMaterial};
use crate::error::{EncryptionError, EncryptionResult};
use crate::ports::outbound::CryptoProvider;
use async_trait::async_trait;
use shared_crypto::armor::{self, ArmorKind};
use shared_crypto::{generate_armored, seal, KeyUserId, StudyKeyPair, StudyPublicKey};

/// secp256k1 ECDH + XChaCha20-Poly1305 provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct SealedBoxProvider;

impl SealedBoxProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CryptoProvider for SealedBoxProvider {
    fn load_public_key(&self, armored: &str) -> EncryptionResult<PublicKeyMaterial> {
        let key = StudyPublicKey::from_armored(armored)?;
        Ok(PublicKeyMaterial::new(key.to_bytes()))
    }

    fn load_private_key(
        &self,
        armored: &str,
        passphrase: Option<&str>,
    ) -> EncryptionResult<PrivateKeyMaterial> {
        let pair = StudyKeyPair::from_armored(armored, passphrase)?;
        Ok(PrivateKeyMaterial::new(pair.to_bytes()))
    }

    async fn encrypt(&self, plaintext: &str, key: &PublicKeyMaterial) -> EncryptionResult<String> {
        let recipient = StudyPublicKey::from_sec1_bytes(key.as_bytes())?;
        let sealed = seal(&recipient, plaintext.as_bytes())?;
        Ok(armor::encode(ArmorKind::Message, &[], &sealed))
    }

    async fn decrypt(
        &self,
        ciphertext: &str,
        key: &PrivateKeyMaterial,
    ) -> EncryptionResult<String> {
        let block = armor::decode(ArmorKind::Message, ciphertext)
            .map_err(|e| EncryptionError::Provider(e.to_string()))?;
        let pair = StudyKeyPair::from_bytes(key.as_bytes())?;
        let opened = pair.open(&block.body)?;
        String::from_utf8(opened).map_err(|e| EncryptionError::Provider(e.to_string()))
    }

    fn generate_key_pair(
        &self,
        name: &str,
        options: &KeyPairOptions,
    ) -> EncryptionResult<GeneratedKeyPair> {
        let keys = generate_armored(
            &KeyUserId {
                name: name.to_string(),
                email: options.email.clone(),
                comment: options.comment.clone(),
            },
            options.passphrase.as_deref(),
        )?;
        Ok(GeneratedKeyPair {
            public_key_armored: keys.public_key,
            private_key_armored: keys.private_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> GeneratedKeyPair {
        SealedBoxProvider
            .generate_key_pair("Lab A", &KeyPairOptions::default())
            .unwrap()
    }

    #[tokio::test]
    async fn test_encrypt_decrypt() {
        let provider = SealedBoxProvider::new();
        let keys = keys();
        let public = provider.load_public_key(&keys.public_key_armored).unwrap();
        let private = provider.load_private_key(&keys.private_key_armored, None).unwrap();

        let ciphertext = provider.encrypt(r#"{"rt":412}"#, &public).await.unwrap();
        assert!(ciphertext.starts_with(&ArmorKind::Message.begin_marker()));
        assert_eq!(
            provider.decrypt(&ciphertext, &private).await.unwrap(),
            r#"{"rt":412}"#
        );
    }

    #[test]
    fn test_wrong_armor_is_key_format_error() {
        let keys = keys();
        let provider = SealedBoxProvider::new();

        assert!(matches!(
            provider.load_public_key(&keys.private_key_armored),
            Err(EncryptionError::InvalidKeyFormat(_))
        ));
        assert!(matches!(
            provider.load_public_key("not a key"),
            Err(EncryptionError::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn test_generate_requires_name() {
        assert!(SealedBoxProvider
            .generate_key_pair("  ", &KeyPairOptions::default())
            .is_err());
    }

    #[test]
    fn test_generated_headers() {
        let keys = SealedBoxProvider
            .generate_key_pair(
                "Lab A",
                &KeyPairOptions {
                    email: Some("lab@example.org".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(keys.public_key_armored.contains("Email: lab@example.org"));
        assert!(!keys.public_key_armored.contains("Comment:"));
    }

    #[tokio::test]
    async fn test_protected_private_key_needs_passphrase() {
        let provider = SealedBoxProvider::new();
        let keys = provider
            .generate_key_pair("Lab A", &KeyPairOptions::default().with_passphrase("s3cret"))
            .unwrap();

        assert!(matches!(
            provider.load_private_key(&keys.private_key_armored, None),
            Err(EncryptionError::Passphrase(_))
        ));
        assert!(matches!(
            provider.load_private_key(&keys.private_key_armored, Some("wrong")),
            Err(EncryptionError::Passphrase(_))
        ));

        let public = provider.load_public_key(&keys.public_key_armored).unwrap();
        let private = provider
            .load_private_key(&keys.private_key_armored, Some("s3cret"))
            .unwrap();
        let ciphertext = provider.encrypt("answer", &public).await.unwrap();
        assert_eq!(provider.decrypt(&ciphertext, &private).await.unwrap(), "answer");
    }

    #[tokio::test]
    async fn test_garbage_ciphertext() {
        let provider = SealedBoxProvider::new();
        let private = provider.load_private_key(&keys().private_key_armored, None).unwrap();

        assert!(matches!(
            provider.decrypt("nope", &private).await,
            Err(EncryptionError::Provider(_))
        ));
    }
}
