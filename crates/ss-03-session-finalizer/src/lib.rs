//! # SS-03: Session Finalizer Subsystem
//!
//! Ends a component: waits for pending encryption, transmits trial data,
//! aggregates status messages and hands control back to the platform with
//! exactly one terminal transition per session.
//!
//! ## Architecture
//!
//! - **Domain**: Continue actions, send modes, message book, phase state, error log
//! - **Ports**: Outbound (PlatformLifecycle, DataChannel, FinishHook)
//! - **Service**: SessionFinalizer
//!
//! ```text
//! finalize ─→ drain ─→ hook ─→ transmit ─→ await list ─→ messages
//!                                                          │
//!                          transition ←─ error-log flush ←─┘
//! ```
//!
//! A failure anywhere before the transition leaves the session unfinished;
//! the caller may call `finalize` again.

pub mod config;
pub mod domain;
pub mod error;
pub mod options;
pub mod ports;
pub mod service;

pub use config::FinalizerConfig;
pub use domain::{
    AggregatedMessages, ContinueAction, DiagnosticLog, FinalizerPhase, MessageBook, Observation,
    ObservedError, SendMode, DIAGNOSTIC_FILENAME, MAX_LOG_LINES, MESSAGE_SEPARATOR,
};
pub use error::{FinalizerError, FinalizerResult, TransportError, TransportResult};
pub use options::FinalizeOptions;
pub use ports::{DataChannel, FinishHook, PlatformLifecycle};
pub use service::{FinalizeOutcome, FinalizerPorts, SessionFinalizer};
