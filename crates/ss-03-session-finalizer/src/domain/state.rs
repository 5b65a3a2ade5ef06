//! Finalizer state: `Idle -> Finalizing -> Finished`.
//!
//! The phase is claimed with a compare-and-swap before anything else runs, so
//! a second call (sequential or concurrent) never repeats the sequence. A run
//! that fails goes back to `Idle` and may be retried.

use super::messages::MessageBook;
use parking_lot::Mutex;
use shared_types::SessionFlags;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle phase of one finalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FinalizerPhase {
    Idle = 0,
    Finalizing = 1,
    Finished = 2,
}

impl FinalizerPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => FinalizerPhase::Idle,
            1 => FinalizerPhase::Finalizing,
            _ => FinalizerPhase::Finished,
        }
    }
}

/// Mutable state of one finalizer.
#[derive(Debug)]
pub struct FinalizerState {
    phase: AtomicU8,
    messages: Mutex<MessageBook>,
    flags: Arc<SessionFlags>,
}

impl FinalizerState {
    pub fn new(flags: Arc<SessionFlags>) -> Self {
        Self {
            phase: AtomicU8::new(FinalizerPhase::Idle as u8),
            messages: Mutex::new(MessageBook::new()),
            flags,
        }
    }

    pub fn phase(&self) -> FinalizerPhase {
        FinalizerPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// `Idle -> Finalizing`. Returns `false` if already running or finished.
    pub fn try_begin(&self) -> bool {
        self.phase
            .compare_exchange(
                FinalizerPhase::Idle as u8,
                FinalizerPhase::Finalizing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// `Finalizing -> Finished`.
    pub fn finish(&self) {
        self.phase
            .store(FinalizerPhase::Finished as u8, Ordering::Release);
    }

    /// `Finalizing -> Idle` after a failed run.
    pub fn abort(&self) {
        self.phase.store(FinalizerPhase::Idle as u8, Ordering::Release);
    }

    pub fn add_message(&self, text: String, persist_to_session: bool) {
        self.messages.lock().add(text, persist_to_session);
    }

    /// Take the messages collected so far.
    pub fn take_messages(&self) -> MessageBook {
        std::mem::take(&mut *self.messages.lock())
    }

    /// Put messages back after a failed run.
    pub fn restore_messages(&self, book: MessageBook) {
        let mut current = self.messages.lock();
        let added_meanwhile = std::mem::replace(&mut *current, book);
        current.merge(added_meanwhile);
    }

    /// Session-wide flags.
    pub fn flags(&self) -> &SessionFlags {
        &self.flags
    }
}
