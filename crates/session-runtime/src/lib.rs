//! # Session Runtime
//!
//! Wires the subsystems into one component session.
//!
//! ## Modules
//!
//! - `config/` - Session settings with environment overrides
//! - `context/` - Session bootstrap and shared session state
//! - `trial/` - Per-trial finishing (encryption, partial sends)
//! - `session_vars/` - Layered session variable lookup
//! - `adapters/` - In-memory hosting platform
//!
//! ## Session Flow
//!
//! ```text
//! prepare ──→ SessionContext ──→ TrialFinisher (per trial)
//!                    │                  │ submit
//!                    │                  ↓
//!                    │          EncryptionQueue ──replace──→ TrialDataStore
//!                    ↓                  │ drain
//!              SessionFinalizer ←───────┘
//!                    │
//!                    ↓
//!          PlatformLifecycle (once)
//! ```

pub mod adapters;
pub mod config;
pub mod context;
pub mod error;
pub mod session_vars;
pub mod trial;

pub use adapters::{InMemoryPlatform, LifecycleCall};
pub use config::SessionConfig;
pub use context::{PlatformPorts, SessionContext};
pub use error::{RuntimeError, RuntimeResult};
pub use session_vars::SessionVars;
pub use trial::{EncryptPolicy, TrialFinisher, TrialOptions, TrialReport};
