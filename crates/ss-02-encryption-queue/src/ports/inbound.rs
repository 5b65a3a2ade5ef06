//! Inbound Ports (Driving Ports / API)

use crate::domain::task::EncryptionTask;
use crate::error::EncryptionResult;
use async_trait::async_trait;
use serde_json::Value;

/// Primary encryption queue API
#[async_trait]
pub trait EncryptionQueueApi: Send + Sync {
    /// Start encrypting `payload` and replace the record at `record_index`
    /// once the ciphertext is ready.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// `EncryptionError::Unavailable` when no public key is loaded.
    fn submit(&self, record_index: u64, payload: Value) -> EncryptionResult<EncryptionTask>;

    /// Join-all barrier over every task submitted so far, including tasks
    /// submitted while the drain is in progress.
    ///
    /// Resolves with the first failure in submission order, if any.
    async fn drain(&self) -> EncryptionResult<()>;

    /// Whether a public key is loaded.
    fn can_encrypt(&self) -> bool;
}
