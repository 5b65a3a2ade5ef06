//! # Sealed Box (anonymous public-key encryption)
//!
//! Anyone holding the study's public key can seal a message; only the holder
//! of the private key can open it.
//!
//! ## Construction
//!
//! ```text
//! ephemeral secp256k1 key e, recipient key R
//! shared  = ECDH(e, R).x
//! key     = SHA-256(DOMAIN || shared || E)          E = compressed e·G
//! sealed  = E (33) || nonce (24) || XChaCha20-Poly1305(key, nonce, plaintext)
//! ```

use crate::armor::{self, ArmorKind};
use crate::protect::{self, PROTECTION_HEADER, PROTECTION_SCHEME};
use crate::symmetric::{self, Nonce, SecretKey, NONCE_LEN};
use crate::CryptoError;
use k256::ecdh::{diffie_hellman, EphemeralSecret};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

const KDF_DOMAIN: &[u8] = b"study-sealed-box-v1";
const POINT_LEN: usize = 33;

/// Recipient public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudyPublicKey(k256::PublicKey);

impl StudyPublicKey {
    /// Parse a compressed or uncompressed SEC1 point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Compressed SEC1 encoding (33 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Parse an armored public key block.
    pub fn from_armored(text: &str) -> Result<Self, CryptoError> {
        let block = armor::decode(ArmorKind::PublicKey, text)?;
        Self::from_sec1_bytes(&block.body)
    }
}

/// Recipient key pair.
pub struct StudyKeyPair {
    secret: k256::SecretKey,
}

impl StudyKeyPair {
    pub fn generate() -> Self {
        Self {
            secret: k256::SecretKey::random(&mut rand::thread_rng()),
        }
    }

    /// Restore from a 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        k256::SecretKey::from_slice(bytes)
            .map(|secret| Self { secret })
            .map_err(|_| CryptoError::InvalidPrivateKey)
    }

    /// Parse an armored private key block.
    ///
    /// `passphrase` is required when the block carries a `Protection`
    /// header and ignored otherwise.
    pub fn from_armored(text: &str, passphrase: Option<&str>) -> Result<Self, CryptoError> {
        let block = armor::decode(ArmorKind::PrivateKey, text)?;
        let protection = block
            .headers
            .iter()
            .find(|(key, _)| key == PROTECTION_HEADER)
            .map(|(_, scheme)| scheme.as_str());

        match protection {
            None => Self::from_bytes(&block.body),
            Some(PROTECTION_SCHEME) => {
                let passphrase = passphrase.ok_or(CryptoError::PassphraseRequired)?;
                let mut secret = protect::unlock(passphrase, &block.body)?;
                let pair = Self::from_bytes(&secret);
                secret.zeroize();
                pair
            }
            Some(other) => Err(CryptoError::InvalidArmor(format!(
                "unsupported key protection {other}"
            ))),
        }
    }

    pub fn public_key(&self) -> StudyPublicKey {
        StudyPublicKey(self.secret.public_key())
    }

    /// Secret scalar bytes (for armoring).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.secret.to_bytes().to_vec()
    }

    /// Open a message produced by [`seal`].
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < POINT_LEN + NONCE_LEN {
            return Err(CryptoError::Truncated { len: sealed.len() });
        }
        let (point, rest) = sealed.split_at(POINT_LEN);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

        let ephemeral = k256::PublicKey::from_sec1_bytes(point)
            .map_err(|_| CryptoError::DecryptionFailed("bad ephemeral key".into()))?;
        let shared = diffie_hellman(self.secret.to_nonzero_scalar(), ephemeral.as_affine());
        let key = derive_key(shared.raw_secret_bytes(), point);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        symmetric::decrypt(&key, ciphertext, &Nonce::from_bytes(nonce))
    }
}

/// Seal `plaintext` for `recipient`.
pub fn seal(recipient: &StudyPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let ephemeral = EphemeralSecret::random(&mut rand::thread_rng());
    let point = ephemeral.public_key().to_encoded_point(true);
    let shared = ephemeral.diffie_hellman(&recipient.0);
    let key = derive_key(shared.raw_secret_bytes(), point.as_bytes());

    let (ciphertext, nonce) = symmetric::encrypt(&key, plaintext)?;

    let mut sealed = Vec::with_capacity(POINT_LEN + NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(point.as_bytes());
    sealed.extend_from_slice(nonce.as_bytes());
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

fn derive_key(shared_x: &[u8], ephemeral_point: &[u8]) -> SecretKey {
    let mut hasher = Sha256::new();
    hasher.update(KDF_DOMAIN);
    hasher.update(shared_x);
    hasher.update(ephemeral_point);
    SecretKey::from_bytes(hasher.finalize().into())
}

/// User id recorded in generated key headers.
#[derive(Clone, Debug, Default)]
pub struct KeyUserId {
    pub name: String,
    pub email: Option<String>,
    pub comment: Option<String>,
}

impl KeyUserId {
    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Name".to_string(), self.name.clone())];
        if let Some(email) = &self.email {
            headers.push(("Email".to_string(), email.clone()));
        }
        if let Some(comment) = &self.comment {
            headers.push(("Comment".to_string(), comment.clone()));
        }
        headers
    }
}

/// Freshly generated keys, armored.
#[derive(Clone, Debug)]
pub struct ArmoredKeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Generate a key pair and armor both halves.
///
/// With a `passphrase` the private half is locked under it.
///
/// # Errors
///
/// `CryptoError::InvalidInput` if `user.name` or the passphrase is empty.
pub fn generate_armored(
    user: &KeyUserId,
    passphrase: Option<&str>,
) -> Result<ArmoredKeyPair, CryptoError> {
    if user.name.trim().is_empty() {
        return Err(CryptoError::InvalidInput("key name is required".into()));
    }

    let pair = StudyKeyPair::generate();
    let headers = user.headers();
    let mut secret = pair.to_bytes();

    let private_key = match passphrase {
        Some(passphrase) => {
            let body = protect::lock(passphrase, &secret);
            secret.zeroize();
            let mut private_headers = headers.clone();
            private_headers.push((PROTECTION_HEADER.to_string(), PROTECTION_SCHEME.to_string()));
            armor::encode(ArmorKind::PrivateKey, &private_headers, &body?)
        }
        None => {
            let text = armor::encode(ArmorKind::PrivateKey, &headers, &secret);
            secret.zeroize();
            text
        }
    };

    Ok(ArmoredKeyPair {
        public_key: armor::encode(ArmorKind::PublicKey, &headers, &pair.public_key().to_bytes()),
        private_key,
    })
}
