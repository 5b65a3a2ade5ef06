//! # Session Context
//!
//! Everything one component session shares: id, flags, the cached order
//! resolution, the encryption queue, the partial-data sequencer and the
//! error log. Built once by [`SessionContext::prepare`] and handed to every
//! trial finisher and finalizer of the session.
//!
//! ## Bootstrap Sequence
//!
//! 1. Await the platform ready signal (optional)
//! 2. Load the public key, enabling encryption
//! 3. Resolve the next component once and cache it
//! 4. Generate the session id

use crate::config::SessionConfig;
use crate::error::RuntimeResult;
use crate::session_vars::SessionVars;
use crate::trial::{TrialFinisher, TrialOptions};
use serde_json::Value;
use shared_types::{EnvelopeSequencer, SessionFlags, SessionId, SessionStore, TrialDataStore};
use ss_01_component_order::{ComponentOrderApi, ComponentOrderService, ResolvedNext, RosterProvider};
use ss_02_encryption_queue::{CryptoProvider, EncryptionQueue, EncryptionQueueApi};
use ss_03_session_finalizer::{
    DataChannel, DiagnosticLog, FinalizeOptions, FinalizerPorts, Observation, ObservedError,
    PlatformLifecycle, SessionFinalizer,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Platform-facing ports of one session.
#[derive(Clone)]
pub struct PlatformPorts {
    pub roster: Arc<dyn RosterProvider>,
    pub lifecycle: Arc<dyn PlatformLifecycle>,
    pub channel: Arc<dyn DataChannel>,
    pub session: Arc<dyn SessionStore>,
}

impl PlatformPorts {
    /// All four ports served by one platform object.
    pub fn from_platform<P>(platform: Arc<P>) -> Self
    where
        P: RosterProvider + PlatformLifecycle + DataChannel + SessionStore + 'static,
    {
        Self {
            roster: platform.clone(),
            lifecycle: platform.clone(),
            channel: platform.clone(),
            session: platform,
        }
    }
}

/// Shared state of one component session.
pub struct SessionContext {
    config: SessionConfig,
    id: SessionId,
    flags: Arc<SessionFlags>,
    resolved: ResolvedNext,
    platform: PlatformPorts,
    trials: Arc<dyn TrialDataStore>,
    queue: Arc<EncryptionQueue>,
    sequencer: EnvelopeSequencer,
    diagnostics: Arc<DiagnosticLog>,
}

impl SessionContext {
    /// Bootstrap a session.
    ///
    /// Order errors are fatal here: a study with an inconsistent custom order
    /// must not start.
    pub async fn prepare(
        config: SessionConfig,
        platform: PlatformPorts,
        trials: Arc<dyn TrialDataStore>,
        provider: Arc<dyn CryptoProvider>,
    ) -> RuntimeResult<Self> {
        if config.wait_for_platform {
            debug!("Waiting for platform");
            platform.lifecycle.ready().await;
        }

        let queue = Arc::new(EncryptionQueue::new(provider, Arc::clone(&trials)));
        if let Some(armored) = &config.public_key_armored {
            queue.load_public_key(armored)?;
            debug!("Public key loaded, encryption enabled");
        }

        let resolved = ComponentOrderService::with_config(config.order.clone())
            .resolve_for(platform.roster.as_ref())?;
        match &resolved {
            ResolvedNext::Absent => debug!("No custom order detected"),
            next => debug!(next = ?next, "Custom order detected"),
        }

        let id = SessionId::generate(platform.roster.study_result_id().as_deref());
        info!(session_id = %id, can_encrypt = queue.can_encrypt(), "Session prepared");

        Ok(Self {
            sequencer: EnvelopeSequencer::new(id.clone()),
            diagnostics: Arc::new(DiagnosticLog::new(config.environment.clone())),
            flags: Arc::new(SessionFlags::new()),
            config,
            id,
            resolved,
            platform,
            trials,
            queue,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn flags(&self) -> &Arc<SessionFlags> {
        &self.flags
    }

    /// Next component, resolved once at bootstrap.
    pub fn resolved(&self) -> &ResolvedNext {
        &self.resolved
    }

    pub fn queue(&self) -> &Arc<EncryptionQueue> {
        &self.queue
    }

    pub fn trials(&self) -> &Arc<dyn TrialDataStore> {
        &self.trials
    }

    pub fn diagnostics(&self) -> &Arc<DiagnosticLog> {
        &self.diagnostics
    }

    pub fn vars(&self) -> SessionVars {
        SessionVars::new(
            Arc::clone(&self.platform.session),
            Arc::clone(&self.platform.roster),
        )
    }

    /// Record an error for the error log.
    pub fn observe_error(&self, error: &ObservedError) -> Observation {
        let observation = self.diagnostics.observe(error);
        if !observation.recorded {
            debug!("Error log full, dropping entry");
        }
        observation
    }

    /// Finalizer for this session's component.
    pub fn finalizer(&self, options: FinalizeOptions) -> RuntimeResult<SessionFinalizer> {
        let queue: Arc<dyn EncryptionQueueApi> = self.queue.clone();
        let ports = FinalizerPorts {
            queue,
            trials: Arc::clone(&self.trials),
            session: Arc::clone(&self.platform.session),
            roster: Arc::clone(&self.platform.roster),
            lifecycle: Arc::clone(&self.platform.lifecycle),
            channel: Arc::clone(&self.platform.channel),
            flags: Arc::clone(&self.flags),
            diagnostics: Arc::clone(&self.diagnostics),
        };
        Ok(SessionFinalizer::new(options, &self.resolved, ports)?
            .with_config(self.config.finalizer.clone()))
    }

    pub fn trial_finisher(self: &Arc<Self>, options: TrialOptions) -> TrialFinisher {
        TrialFinisher::new(Arc::clone(self), options)
    }

    /// Append one record as a partial-data envelope.
    ///
    /// Returns `false` without sending once the full payload went out.
    pub async fn send_partial(&self, content: Value) -> RuntimeResult<bool> {
        if self.flags.full_payload_sent() {
            warn!("Ignoring partial send, full results already sent");
            return Ok(false);
        }

        let envelope = self.sequencer.wrap(content);
        debug!(sequence = envelope.sequence, collection_id = %envelope.collection_id, "Appending partial data");
        self.platform.channel.append_payload(envelope.to_line()?).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPlatform;
    use serde_json::json;
    use shared_types::{ComponentDescriptor, ComponentId, InMemoryTrialStore, Roster};
    use ss_01_component_order::ConfigError;
    use ss_02_encryption_queue::SealedBoxProvider;
    use ss_03_session_finalizer::ContinueAction;
    use std::time::Duration;

    fn roster() -> Roster {
        Roster::new(vec![
            ComponentDescriptor::new(1, "u1", 1),
            ComponentDescriptor::new(2, "u2", 2),
            ComponentDescriptor::new(3, "u3", 3),
        ])
    }

    async fn prepare(platform: Arc<InMemoryPlatform>) -> RuntimeResult<SessionContext> {
        SessionContext::prepare(
            SessionConfig::default(),
            PlatformPorts::from_platform(platform),
            Arc::new(InMemoryTrialStore::new()),
            Arc::new(SealedBoxProvider),
        )
        .await
    }

    #[tokio::test]
    async fn test_prepare_without_custom_order() {
        let platform = Arc::new(InMemoryPlatform::new(roster(), 1).with_result_ids("77", "301"));
        let context = prepare(platform).await.unwrap();

        assert_eq!(context.resolved(), &ResolvedNext::Absent);
        assert!(context.id().as_str().starts_with("77-"));
        assert_eq!(context.id().as_str().len(), "77-".len() + 8);
        assert!(!context.queue().can_encrypt());
    }

    #[tokio::test]
    async fn test_prepare_resolves_custom_order_once() {
        let platform = Arc::new(
            InMemoryPlatform::new(roster(), 1)
                .with_study_config(json!({"otputil_order": {
                    "order": {"A": ["a", "c", "b"]},
                    "uuid": {"a": "u1", "b": "u2", "c": "u3"}
                }}))
                .with_query("order", "A"),
        );
        let context = prepare(platform).await.unwrap();

        assert_eq!(
            context.resolved(),
            &ResolvedNext::Component(ComponentId::Numeric(3))
        );
        let finalizer = context.finalizer(FinalizeOptions::default()).unwrap();
        assert_eq!(
            finalizer.options().continue_with,
            ContinueAction::JumpToComponent(ComponentId::Numeric(3))
        );
    }

    #[tokio::test]
    async fn test_prepare_fails_on_bad_order() {
        let platform = Arc::new(
            InMemoryPlatform::new(roster(), 1)
                .with_study_config(json!({"otputil_order": {"order": {"A": ["a"]}}}))
                .with_query("order", "A"),
        );
        assert!(matches!(
            prepare(platform).await,
            Err(crate::error::RuntimeError::Order(ConfigError::MissingUuidMap))
        ));
    }

    #[tokio::test]
    async fn test_prepare_waits_for_platform() {
        let platform = Arc::new(InMemoryPlatform::new(roster(), 1).not_ready());
        let pending = tokio::spawn(prepare(Arc::clone(&platform)));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!pending.is_finished());

        platform.signal_ready();
        assert!(pending.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_prepare_rejects_bad_key() {
        let platform = Arc::new(InMemoryPlatform::new(roster(), 1));
        let result = SessionContext::prepare(
            SessionConfig::default().with_public_key("not a key"),
            PlatformPorts::from_platform(platform),
            Arc::new(InMemoryTrialStore::new()),
            Arc::new(SealedBoxProvider),
        )
        .await;
        assert!(matches!(result, Err(crate::error::RuntimeError::Encryption(_))));
    }

    #[tokio::test]
    async fn test_partial_sequence_and_cutoff() {
        let platform = Arc::new(InMemoryPlatform::new(roster(), 1));
        let context = prepare(Arc::clone(&platform)).await.unwrap();

        assert!(context.send_partial(json!({"rt": 1})).await.unwrap());
        assert!(context.send_partial(json!({"rt": 2})).await.unwrap());
        context.flags().mark_full_payload_sent();
        assert!(!context.send_partial(json!({"rt": 3})).await.unwrap());

        let appended = platform.appended();
        assert_eq!(appended.len(), 2);
        assert!(appended.iter().all(|line| line.ends_with('\n')));
        let first: Value = serde_json::from_str(appended[0].trim_end()).unwrap();
        let second: Value = serde_json::from_str(appended[1].trim_end()).unwrap();
        assert_eq!(first["start"], json!(true));
        assert_eq!(first["collectionId"], json!(context.id().as_str()));
        assert_eq!(second["sequence"], json!(1));
        assert!(second.get("start").is_none());
    }
}
