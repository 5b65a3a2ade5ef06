//! # SS-02: Encryption Queue Subsystem
//!
//! Encrypts selected trial records in the background and replaces them in the
//! trial-data store, keeping only bookkeeping fields next to the ciphertext.
//!
//! ## Architecture
//!
//! - **Domain**: Key material, plaintext conversion, record redaction, task handles
//! - **Ports**: Inbound (EncryptionQueueApi) and Outbound (CryptoProvider)
//! - **Adapters**: SealedBoxProvider over `shared-crypto`
//! - **Service**: EncryptionQueue
//!
//! ```text
//! trial finisher ──submit──→ [task] [task] [task] ──replace──→ TrialDataStore
//!                                    │
//! session finalizer ──drain (join-all barrier)
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::SealedBoxProvider;
pub use domain::keys::{GeneratedKeyPair, KeyPairOptions, PrivateKeyMaterial, PublicKeyMaterial};
pub use domain::record::{ENCRYPTED_DATA_FIELD, RETAINED_FIELDS};
pub use domain::task::{EncryptionTask, TaskOutcome};
pub use error::{EncryptionError, EncryptionResult};
pub use ports::inbound::EncryptionQueueApi;
pub use ports::outbound::CryptoProvider;
pub use service::EncryptionQueue;
