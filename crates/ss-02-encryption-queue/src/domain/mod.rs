//! Domain layer for the encryption queue

pub mod keys;
pub mod plaintext;
pub mod record;
pub mod task;

pub use keys::{GeneratedKeyPair, KeyPairOptions, PrivateKeyMaterial, PublicKeyMaterial};
pub use plaintext::to_plaintext;
pub use record::{redact, ENCRYPTED_DATA_FIELD, RETAINED_FIELDS};
pub use task::{EncryptionTask, TaskOutcome};
