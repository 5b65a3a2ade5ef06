//! # Trial Finisher
//!
//! Per-trial path, run as each trial ends:
//!
//! 1. Store the record
//! 2. Encrypt it when the policy says so (waits for this record's task)
//! 3. Log it (debug data)
//! 4. Append it as a partial-data envelope (optional)

use crate::context::SessionContext;
use crate::error::{RuntimeError, RuntimeResult};
use serde_json::Value;
use shared_types::{TrialRecord, TRIAL_INDEX_FIELD};
use ss_02_encryption_queue::EncryptionQueueApi;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Decides per record whether it is encrypted.
#[derive(Clone, Default)]
pub enum EncryptPolicy {
    #[default]
    Never,
    Always,
    /// Encrypt when the named field is truthy.
    Field(String),
    Predicate(Arc<dyn Fn(&TrialRecord) -> bool + Send + Sync>),
}

impl EncryptPolicy {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&TrialRecord) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn applies_to(&self, record: &TrialRecord) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Field(name) => record.get(name).is_some_and(is_truthy),
            Self::Predicate(f) => f(record),
        }
    }
}

impl fmt::Debug for EncryptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Always => f.write_str("Always"),
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0 && !x.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrialOptions {
    pub encrypt_if: EncryptPolicy,
    pub send_partial: bool,
    pub debug_data: bool,
}

impl TrialOptions {
    pub fn encrypt_if(mut self, policy: EncryptPolicy) -> Self {
        self.encrypt_if = policy;
        self
    }

    pub fn send_partial(mut self) -> Self {
        self.send_partial = true;
        self
    }

    pub fn debug_data(mut self) -> Self {
        self.debug_data = true;
        self
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrialReport {
    pub encrypted: bool,
    /// A partial envelope was appended.
    pub sent_partial: bool,
}

/// Finishes trials of one session with fixed options.
pub struct TrialFinisher {
    context: Arc<SessionContext>,
    options: TrialOptions,
}

impl TrialFinisher {
    pub fn new(context: Arc<SessionContext>, options: TrialOptions) -> Self {
        Self { context, options }
    }

    pub fn options(&self) -> &TrialOptions {
        &self.options
    }

    pub async fn finish(&self, record: TrialRecord) -> RuntimeResult<TrialReport> {
        let trials = self.context.trials();
        let will_encrypt = self.options.encrypt_if.applies_to(&record);
        let index = record.get(TRIAL_INDEX_FIELD).and_then(Value::as_u64);
        trials.push_record(record.clone());

        let mut report = TrialReport::default();
        let mut data = record;
        if will_encrypt {
            let index = index.ok_or(RuntimeError::MissingTrialIndex)?;
            let task = self
                .context
                .queue()
                .submit(index, Value::Object(data.clone()))?;
            task.settled().await?;
            // the stored record now carries the ciphertext
            if let Some(redacted) = trials.record_at_index(index) {
                data = redacted;
            }
            report.encrypted = true;
        }

        if self.options.debug_data {
            debug!(trial_index = ?index, data = %serde_json::Value::Object(data.clone()), "Trial data");
        }

        if self.options.send_partial {
            report.sent_partial = self.context.send_partial(Value::Object(data)).await?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPlatform;
    use crate::config::SessionConfig;
    use crate::context::PlatformPorts;
    use serde_json::json;
    use shared_types::{ComponentDescriptor, InMemoryTrialStore, Roster};
    use ss_02_encryption_queue::{
        EncryptionError, EncryptionQueue, KeyPairOptions, SealedBoxProvider, ENCRYPTED_DATA_FIELD,
    };

    fn record(value: Value) -> TrialRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    async fn context(public_key: Option<String>) -> (Arc<SessionContext>, Arc<InMemoryPlatform>) {
        let platform = Arc::new(InMemoryPlatform::new(
            Roster::new(vec![ComponentDescriptor::new(1, "u1", 1)]),
            1,
        ));
        let mut config = SessionConfig::default();
        config.public_key_armored = public_key;
        let context = SessionContext::prepare(
            config,
            PlatformPorts::from_platform(Arc::clone(&platform)),
            Arc::new(InMemoryTrialStore::new()),
            Arc::new(SealedBoxProvider),
        )
        .await
        .unwrap();
        (Arc::new(context), platform)
    }

    fn key_pair() -> (String, String) {
        let keys = EncryptionQueue::new(Arc::new(SealedBoxProvider), Arc::new(InMemoryTrialStore::new()))
            .generate_key_pair("lab", &KeyPairOptions::default())
            .unwrap();
        (keys.public_key_armored, keys.private_key_armored)
    }

    #[test]
    fn test_policies() {
        let r = record(json!({"sensitive": 1, "empty": "", "rt": 300}));
        assert!(!EncryptPolicy::Never.applies_to(&r));
        assert!(EncryptPolicy::Always.applies_to(&r));
        assert!(EncryptPolicy::Field("sensitive".into()).applies_to(&r));
        assert!(!EncryptPolicy::Field("empty".into()).applies_to(&r));
        assert!(!EncryptPolicy::Field("absent".into()).applies_to(&r));
        let slow = EncryptPolicy::predicate(|r| r.get("rt").and_then(Value::as_u64) > Some(250));
        assert!(slow.applies_to(&r));
    }

    #[tokio::test]
    async fn test_plain_record_is_stored() {
        let (context, platform) = context(None).await;
        let finisher = context.trial_finisher(TrialOptions::default());

        let report = finisher
            .finish(record(json!({"trial_index": 0, "rt": 412})))
            .await
            .unwrap();

        assert_eq!(report, TrialReport::default());
        assert_eq!(context.trials().all_records().len(), 1);
        assert!(platform.appended().is_empty());
    }

    #[tokio::test]
    async fn test_encrypt_without_key() {
        let (context, _) = context(None).await;
        let finisher = context.trial_finisher(TrialOptions::default().encrypt_if(EncryptPolicy::Always));

        let result = finisher.finish(record(json!({"trial_index": 0}))).await;
        assert!(matches!(
            result,
            Err(RuntimeError::Encryption(EncryptionError::Unavailable))
        ));
    }

    #[tokio::test]
    async fn test_encrypted_record_round_trips() {
        let (public_key, private_key) = key_pair();
        let (context, platform) = context(Some(public_key)).await;
        let finisher = context.trial_finisher(
            TrialOptions::default()
                .encrypt_if(EncryptPolicy::Field("sensitive".into()))
                .send_partial(),
        );

        let report = finisher
            .finish(record(json!({
                "trial_index": 4,
                "trial_type": "survey",
                "sensitive": true,
                "answer": "secret"
            })))
            .await
            .unwrap();
        assert!(report.encrypted && report.sent_partial);

        let stored = context.trials().record_at_index(4).unwrap();
        assert_eq!(stored.get("trial_type"), Some(&json!("survey")));
        assert!(stored.get("answer").is_none());
        let ciphertext = stored[ENCRYPTED_DATA_FIELD].as_str().unwrap().to_string();

        context.queue().load_private_key(&private_key, None).unwrap();
        let plaintext = context.queue().decrypt(&ciphertext).await.unwrap();
        let original: Value = serde_json::from_str(&plaintext).unwrap();
        assert_eq!(original["answer"], json!("secret"));

        let envelope: Value = serde_json::from_str(platform.appended()[0].trim_end()).unwrap();
        assert_eq!(envelope["content"][ENCRYPTED_DATA_FIELD], json!(ciphertext));
    }

    #[tokio::test]
    async fn test_encrypt_needs_trial_index() {
        let (public_key, _) = key_pair();
        let (context, _) = context(Some(public_key)).await;
        let finisher = context.trial_finisher(TrialOptions::default().encrypt_if(EncryptPolicy::Always));

        assert!(matches!(
            finisher.finish(record(json!({"rt": 1}))).await,
            Err(RuntimeError::MissingTrialIndex)
        ));
    }
}
