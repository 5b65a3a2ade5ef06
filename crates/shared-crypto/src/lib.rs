//! # Shared Crypto - Study Data Encryption
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `sealed_box` | secp256k1 ECDH + XChaCha20-Poly1305 | Encrypting trial records for the study owner |
//! | `symmetric` | XChaCha20-Poly1305 | Payload cipher |
//! | `armor` | hex text blocks | Keys and ciphertext inside study configuration |
//! | `protect` | PBKDF2-HMAC-SHA256 + XChaCha20-Poly1305 | Passphrase-protected private keys |
//!
//! ## Security Properties
//!
//! - **Ephemeral sender keys**: every sealed message uses a fresh key, so two
//!   seals of the same record differ.
//! - **XChaCha20**: 192-bit random nonces, authenticated.
//! - **Zeroize**: content keys are wiped on drop.

#![warn(clippy::all)]

pub mod armor;
pub mod errors;
pub mod protect;
pub mod sealed_box;
pub mod symmetric;

// Re-exports
pub use armor::{ArmorKind, Armored};
pub use errors::CryptoError;
pub use sealed_box::{
    generate_armored, seal, ArmoredKeyPair, KeyUserId, StudyKeyPair, StudyPublicKey,
};
