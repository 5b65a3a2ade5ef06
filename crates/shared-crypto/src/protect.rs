//! # Passphrase Protection
//!
//! Private keys may be stored encrypted under a passphrase:
//!
//! ```text
//! key    = PBKDF2-HMAC-SHA256(passphrase, salt, ROUNDS)
//! body   = salt (16) || nonce (24) || XChaCha20-Poly1305(key, nonce, secret)
//! ```
//!
//! The armored block announces this with a `Protection` header.

use crate::symmetric::{self, Nonce, SecretKey, NONCE_LEN};
use crate::CryptoError;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

/// Armor header marking a passphrase-protected body.
pub const PROTECTION_HEADER: &str = "Protection";

/// Value of [`PROTECTION_HEADER`] for this scheme.
pub const PROTECTION_SCHEME: &str = "pbkdf2-sha256-xchacha20poly1305";

/// PBKDF2 iteration count.
pub const ROUNDS: u32 = 100_000;

const SALT_LEN: usize = 16;

/// Encrypt `secret` under `passphrase`.
pub fn lock(passphrase: &str, secret: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if passphrase.is_empty() {
        return Err(CryptoError::InvalidInput("passphrase must not be empty".into()));
    }

    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let key = derive(passphrase, &salt);
    let (ciphertext, nonce) = symmetric::encrypt(&key, secret)?;

    let mut body = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(nonce.as_bytes());
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

/// Recover the secret locked by [`lock`].
///
/// # Errors
///
/// `CryptoError::WrongPassphrase` when authentication fails.
pub fn unlock(passphrase: &str, body: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if body.len() < SALT_LEN + NONCE_LEN {
        return Err(CryptoError::Truncated { len: body.len() });
    }
    let (salt, rest) = body.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);
    let key = derive(passphrase, salt);

    symmetric::decrypt(&key, ciphertext, &Nonce::from_bytes(nonce))
        .map_err(|_| CryptoError::WrongPassphrase)
}

fn derive(passphrase: &str, salt: &[u8]) -> SecretKey {
    let mut bytes = [0u8; 32];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, ROUNDS, &mut bytes);
    let key = SecretKey::from_bytes(bytes);
    bytes.zeroize();
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_unlock() {
        let body = lock("correct horse", &[9u8; 32]).unwrap();

        assert_eq!(body.len(), SALT_LEN + NONCE_LEN + 32 + 16);
        assert_eq!(unlock("correct horse", &body).unwrap(), vec![9u8; 32]);
        assert_eq!(unlock("battery staple", &body), Err(CryptoError::WrongPassphrase));
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        assert!(matches!(lock("", b"secret"), Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_truncated_body() {
        assert_eq!(unlock("pw", &[0u8; 8]), Err(CryptoError::Truncated { len: 8 }));
    }
}
