//! Domain layer for session finalization

pub mod continue_action;
pub mod diagnostics;
pub mod messages;
pub mod send_mode;
pub mod state;

pub use continue_action::ContinueAction;
pub use diagnostics::{DiagnosticLog, Observation, ObservedError, DIAGNOSTIC_FILENAME, MAX_LOG_LINES};
pub use messages::{unique_in_order, AggregatedMessages, MessageBook, MESSAGE_SEPARATOR};
pub use send_mode::SendMode;
pub use state::{FinalizerPhase, FinalizerState};
