//! Encryption Queue Service
//!
//! Main service implementing EncryptionQueueApi.

use crate::domain::keys::{GeneratedKeyPair, KeyPairOptions, PrivateKeyMaterial, PublicKeyMaterial};
use crate::domain::plaintext::to_plaintext;
use crate::domain::record::redact;
use crate::domain::task::EncryptionTask;
use crate::error::{EncryptionError, EncryptionResult};
use crate::ports::inbound::EncryptionQueueApi;
use crate::ports::outbound::CryptoProvider;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared_types::TrialDataStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Encryption Queue
///
/// Owns the session's key material and every task ever submitted. Tasks
/// settle in any order; [`drain`](EncryptionQueueApi::drain) is a join-all
/// barrier, not an in-order flush.
pub struct EncryptionQueue {
    provider: Arc<dyn CryptoProvider>,
    store: Arc<dyn TrialDataStore>,
    public_key: RwLock<Option<PublicKeyMaterial>>,
    private_key: RwLock<Option<Arc<PrivateKeyMaterial>>>,
    ledger: Mutex<TaskLedger>,
}

/// Submitted tasks, in submission order.
///
/// Tasks are never removed while unsettled. Settled successes are pruned by
/// drains; failures stay so every later drain reports them.
#[derive(Default)]
struct TaskLedger {
    tasks: Vec<EncryptionTask>,
    submitted: usize,
}

impl TaskLedger {
    fn snapshot(&self) -> (Vec<EncryptionTask>, usize) {
        (self.tasks.clone(), self.submitted)
    }

    fn first_failure(&self) -> Option<EncryptionError> {
        self.tasks
            .iter()
            .find_map(|task| task.peek().and_then(|outcome| outcome.clone().err()))
    }

    fn prune_succeeded(&mut self) {
        self.tasks.retain(|task| !matches!(task.peek(), Some(Ok(()))));
    }
}

impl EncryptionQueue {
    pub fn new(provider: Arc<dyn CryptoProvider>, store: Arc<dyn TrialDataStore>) -> Self {
        Self {
            provider,
            store,
            public_key: RwLock::new(None),
            private_key: RwLock::new(None),
            ledger: Mutex::new(TaskLedger::default()),
        }
    }

    /// Load the armored public key used by every later submission.
    pub fn load_public_key(&self, armored: &str) -> EncryptionResult<()> {
        let key = self.provider.load_public_key(armored)?;
        *self.public_key.write() = Some(key);
        info!("Public key loaded, encryption enabled");
        Ok(())
    }

    /// Load the armored private key used by [`decrypt`](Self::decrypt).
    ///
    /// `passphrase` unlocks a protected key.
    pub fn load_private_key(&self, armored: &str, passphrase: Option<&str>) -> EncryptionResult<()> {
        let key = self.provider.load_private_key(armored, passphrase)?;
        *self.private_key.write() = Some(Arc::new(key));
        Ok(())
    }

    /// Encrypt a value directly, outside the queue.
    pub async fn encrypt(&self, payload: &Value) -> EncryptionResult<String> {
        let key = self.public_key()?;
        self.provider.encrypt(&to_plaintext(payload), &key).await
    }

    /// Decrypt armored ciphertext with the loaded private key.
    pub async fn decrypt(&self, ciphertext: &str) -> EncryptionResult<String> {
        let key = self
            .private_key
            .read()
            .clone()
            .ok_or(EncryptionError::PrivateKeyUnavailable)?;
        self.provider.decrypt(ciphertext, &key).await
    }

    /// Generate a key pair through the provider.
    pub fn generate_key_pair(
        &self,
        name: &str,
        options: &KeyPairOptions,
    ) -> EncryptionResult<GeneratedKeyPair> {
        self.provider.generate_key_pair(name, options)
    }

    /// Tasks not yet observed as settled.
    pub fn pending_count(&self) -> usize {
        self.ledger
            .lock()
            .tasks
            .iter()
            .filter(|task| task.peek().is_none())
            .count()
    }

    /// Tasks submitted over the queue's lifetime.
    pub fn submitted_count(&self) -> usize {
        self.ledger.lock().submitted
    }

    fn public_key(&self) -> EncryptionResult<PublicKeyMaterial> {
        self.public_key
            .read()
            .clone()
            .ok_or(EncryptionError::Unavailable)
    }
}

#[async_trait]
impl EncryptionQueueApi for EncryptionQueue {
    fn submit(&self, record_index: u64, payload: Value) -> EncryptionResult<EncryptionTask> {
        let key = self.public_key()?;
        let provider = Arc::clone(&self.provider);
        let store = Arc::clone(&self.store);

        let task = EncryptionTask::spawn(record_index, async move {
            let ciphertext = provider.encrypt(&to_plaintext(&payload), &key).await?;

            let replaced = store.update_record_at_index(record_index, &|original| {
                redact(original, ciphertext.clone())
            });
            if replaced {
                debug!(record_index, "Replaced trial record with ciphertext");
            } else {
                warn!(record_index, "No single trial record at index, ciphertext dropped");
            }
            Ok(())
        });

        debug!(record_index, "Encryption task submitted");
        let mut ledger = self.ledger.lock();
        ledger.tasks.push(task.clone());
        ledger.submitted += 1;
        Ok(task)
    }

    async fn drain(&self) -> EncryptionResult<()> {
        let mut rounds = 0usize;
        loop {
            let (tasks, seen) = self.ledger.lock().snapshot();
            join_all(tasks.iter().map(EncryptionTask::settled)).await;
            rounds += 1;
            if self.ledger.lock().submitted == seen {
                break;
            }
        }

        let mut ledger = self.ledger.lock();
        let first_failure = ledger.first_failure();
        ledger.prune_succeeded();

        match first_failure {
            Some(err) => {
                warn!(error = %err, tasks = ledger.submitted, "Encryption drain finished with failure");
                Err(err)
            }
            None => {
                debug!(rounds, tasks = ledger.submitted, "Encryption drain complete");
                Ok(())
            }
        }
    }

    fn can_encrypt(&self) -> bool {
        self.public_key.read().is_some()
    }
}
