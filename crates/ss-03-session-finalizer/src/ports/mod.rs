//! Ports module for session finalization
//!
//! The finalizer has no inbound trait of its own; it is driven through
//! [`SessionFinalizer`](crate::SessionFinalizer) and extended through
//! [`FinishHook`].

pub mod outbound;

pub use outbound::{DataChannel, FinishHook, PlatformLifecycle};
