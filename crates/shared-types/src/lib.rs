//! # Shared Types Crate
//!
//! Domain entities and collaborator ports used by more than one subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: roster and session types are defined here once.
//! - **Read-only roster**: the component roster is owned by the hosting
//!   platform; subsystems only inspect it.
//! - **Explicit session context**: session-wide flags live in [`SessionFlags`],
//!   passed to each operation instead of living in process globals.

pub mod entities;
pub mod envelope;
pub mod session;
pub mod store;

pub use entities::*;
pub use envelope::{EnvelopeSequencer, PartialDataEnvelope, PARTIAL_DATA_TYPE_ARRAY_ITEM};
pub use session::{SessionFlags, SessionId, SESSION_SUFFIX_LEN};
pub use store::{InMemoryTrialStore, SessionStore, TrialDataStore, TrialRecord, TRIAL_INDEX_FIELD};
