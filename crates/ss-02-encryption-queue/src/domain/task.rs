//! In-flight encryption work.
//!
//! Each task runs on its own tokio task. The handle wraps the join in a
//! [`Shared`] future so the submitter and the drain barrier can both await
//! the same outcome.

use crate::error::{EncryptionError, EncryptionResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;

/// Settled result of one task.
pub type TaskOutcome = EncryptionResult<()>;

/// Handle to one record's encryption.
#[derive(Clone)]
pub struct EncryptionTask {
    record_index: u64,
    outcome: Shared<BoxFuture<'static, TaskOutcome>>,
}

impl EncryptionTask {
    /// Start `work` on the tokio runtime.
    pub fn spawn<F>(record_index: u64, work: F) -> Self
    where
        F: Future<Output = TaskOutcome> + Send + 'static,
    {
        let join = tokio::spawn(work);
        let outcome = async move {
            join.await
                .unwrap_or_else(|e| Err(EncryptionError::TaskFailed(e.to_string())))
        }
        .boxed()
        .shared();

        Self {
            record_index,
            outcome,
        }
    }

    pub fn record_index(&self) -> u64 {
        self.record_index
    }

    /// Wait for the task to settle.
    pub async fn settled(&self) -> TaskOutcome {
        self.outcome.clone().await
    }

    /// Outcome, if already observed as settled.
    pub fn peek(&self) -> Option<&TaskOutcome> {
        self.outcome.peek()
    }
}

impl fmt::Debug for EncryptionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionTask")
            .field("record_index", &self.record_index)
            .field("settled", &self.peek().is_some())
            .finish()
    }
}
