//! Session Finalizer Service
//!
//! One finalizer per component. The sequence:
//!
//! 1. Barrier: drain the encryption queue
//! 2. Before-finish hook
//! 3. Collect trial records (plus the interaction-event record)
//! 4. Transmit according to the send mode, then join the await list
//! 5. Aggregate messages, persist the session list
//! 6. Flush the diagnostic log (best effort)
//! 7. Terminal transition, at most once per session

use crate::config::FinalizerConfig;
use crate::domain::continue_action::ContinueAction;
use crate::domain::diagnostics::DiagnosticLog;
use crate::domain::messages::{AggregatedMessages, MessageBook};
use crate::domain::send_mode::SendMode;
use crate::domain::state::{FinalizerPhase, FinalizerState};
use crate::error::{FinalizerError, FinalizerResult, TransportResult};
use crate::options::FinalizeOptions;
use crate::ports::outbound::{DataChannel, FinishHook, PlatformLifecycle};
use futures::future::{join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use shared_types::{SessionFlags, SessionStore, TrialDataStore};
use ss_01_component_order::{ResolvedNext, RosterProvider};
use ss_02_encryption_queue::EncryptionQueueApi;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of one finalize call.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    /// Terminal transition performed
    Transitioned(ContinueAction),
    /// Continue option was falsy; no transition
    Skipped,
    /// This finalizer, or another one of the session, already transitioned
    AlreadyFinished,
    /// Continue option not understood; logged, no transition
    Unhandled(Value),
}

/// Collaborators of a finalizer.
#[derive(Clone)]
pub struct FinalizerPorts {
    pub queue: Arc<dyn EncryptionQueueApi>,
    pub trials: Arc<dyn TrialDataStore>,
    pub session: Arc<dyn SessionStore>,
    pub roster: Arc<dyn RosterProvider>,
    pub lifecycle: Arc<dyn PlatformLifecycle>,
    pub channel: Arc<dyn DataChannel>,
    pub flags: Arc<SessionFlags>,
    pub diagnostics: Arc<DiagnosticLog>,
}

type PendingAwait = BoxFuture<'static, TransportResult<()>>;

/// Session Finalizer
pub struct SessionFinalizer {
    config: FinalizerConfig,
    options: FinalizeOptions,
    ports: FinalizerPorts,
    hook: Option<Arc<dyn FinishHook>>,
    state: FinalizerState,
    awaits: Mutex<Vec<PendingAwait>>,
}

impl SessionFinalizer {
    /// Create a finalizer for the current component.
    ///
    /// `resolved` is the session's cached order resolution; with a custom
    /// order in effect the continue option must be plain advance.
    pub fn new(
        options: FinalizeOptions,
        resolved: &ResolvedNext,
        ports: FinalizerPorts,
    ) -> FinalizerResult<Self> {
        let mut options = options;
        options.continue_with = options.continue_with.apply_order(resolved)?;
        if resolved.is_custom() {
            debug!(continue_with = %options.continue_with, "Continue rewritten by custom order");
        }

        Ok(Self {
            config: FinalizerConfig::default(),
            options,
            state: FinalizerState::new(Arc::clone(&ports.flags)),
            ports,
            hook: None,
            awaits: Mutex::new(Vec::new()),
        })
    }

    pub fn with_config(mut self, config: FinalizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn FinishHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Effective options, after the custom-order rewrite.
    pub fn options(&self) -> &FinalizeOptions {
        &self.options
    }

    pub fn phase(&self) -> FinalizerPhase {
        self.state.phase()
    }

    /// Queue a message for the outgoing platform message. No I/O.
    ///
    /// `persist_to_session` also keeps it in session storage, so the last
    /// component of the session shows it again.
    pub fn add_message(&self, text: impl Into<String>, persist_to_session: bool) {
        self.state.add_message(text.into(), persist_to_session);
    }

    /// Add a future to the await list, joined after transmission.
    pub fn push_await<F>(&self, fut: F)
    where
        F: Future<Output = TransportResult<()>> + Send + 'static,
    {
        self.awaits.lock().push(fut.boxed());
    }

    /// Futures currently on the await list.
    pub fn pending_awaits(&self) -> usize {
        self.awaits.lock().len()
    }

    /// Run the finalize sequence.
    ///
    /// A second call, concurrent or later, is a logged no-op. A failed run
    /// leaves the finalizer idle so it can be called again.
    pub async fn finalize(&self) -> FinalizerResult<FinalizeOutcome> {
        if !self.state.try_begin() {
            debug!(phase = ?self.state.phase(), "Finalize already ran, ignoring call");
            return Ok(FinalizeOutcome::AlreadyFinished);
        }

        match self.run().await {
            Ok(outcome) => {
                self.state.finish();
                Ok(outcome)
            }
            Err(err) => {
                error!(error = %err, "Finalize failed");
                self.state.abort();
                Err(err)
            }
        }
    }

    async fn run(&self) -> FinalizerResult<FinalizeOutcome> {
        // 1. encryption barrier
        self.ports.queue.drain().await?;
        debug!("Pending encryption settled");

        // 2. hook
        if let Some(hook) = &self.hook {
            hook.before_finish(self).await?;
        }

        // 3-4. collect and transmit
        self.transmit()?;
        self.join_awaits().await?;

        // 5. messages
        let book = self.state.take_messages();
        let messages = self.aggregate_messages(book.clone());

        if self.options.continue_with.is_skip() {
            debug!("Continue is false, skipping transition");
            return Ok(FinalizeOutcome::Skipped);
        }

        // 6. diagnostics
        self.flush_diagnostics().await;

        // 7. transition
        self.transition(messages.outgoing.as_deref())
            .await
            .inspect_err(|_| self.state.restore_messages(book))
    }

    /// Every await runs to completion; the first failure in push order is
    /// reported.
    async fn join_awaits(&self) -> FinalizerResult<()> {
        let awaits = std::mem::take(&mut *self.awaits.lock());
        let total = awaits.len();
        let mut failures = join_all(awaits)
            .await
            .into_iter()
            .filter_map(Result::err);

        match failures.next() {
            Some(first) => {
                warn!(error = %first, failed = 1 + failures.count(), total, "Await list failed");
                Err(first.into())
            }
            None => Ok(()),
        }
    }

    fn collect_payload(&self) -> FinalizerResult<String> {
        let mut records: Vec<Value> = self
            .ports
            .trials
            .all_records()
            .into_iter()
            .map(Value::Object)
            .collect();
        if self.options.add_interaction_events {
            let mut interaction = Map::new();
            interaction.insert(
                self.config.interaction_field.clone(),
                Value::Array(self.ports.trials.interaction_events()),
            );
            records.push(Value::Object(interaction));
        }
        serde_json::to_string(&records).map_err(|e| FinalizerError::Serialization(e.to_string()))
    }

    fn transmit(&self) -> FinalizerResult<()> {
        let channel = Arc::clone(&self.ports.channel);
        match &self.options.send_mode {
            SendMode::Skip => debug!("Send mode is false, skipping transmission"),
            SendMode::SubmitOnce => {
                let payload = self.collect_payload()?;
                info!(bytes = payload.len(), "Submitting result data");
                self.push_await(async move { channel.submit_full_payload(payload).await });
                self.ports.flags.mark_full_payload_sent();
            }
            SendMode::Append => {
                let payload = self.collect_payload()?;
                info!(bytes = payload.len(), "Appending result data");
                self.push_await(async move { channel.append_payload(payload).await });
            }
            SendMode::Unrecognized(raw) => {
                error!(send_mode = %raw, "Send mode value not handled");
            }
        }
        Ok(())
    }

    fn aggregate_messages(&self, book: MessageBook) -> AggregatedMessages {
        let key = self.config.session_messages_key.as_str();
        let stored: Vec<String> = match self.ports.session.get_var(key) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let is_last = self
            .ports
            .roster
            .component_list()
            .is_last_component(self.ports.roster.current_component_position());

        let aggregated = book.aggregate(stored, &self.options.message, is_last);

        if !aggregated.session.is_empty() {
            self.ports.session.set_var(key, json!(aggregated.session));
        }
        debug!(
            is_last_component = is_last,
            session_messages = aggregated.session.len(),
            "Messages aggregated"
        );
        aggregated
    }

    async fn flush_diagnostics(&self) {
        let component_result_id = self.ports.roster.component_result_id();
        let study_result_id = self.ports.roster.study_result_id();
        let Some(body) = self
            .ports
            .diagnostics
            .render(component_result_id.as_deref(), study_result_id.as_deref())
        else {
            return;
        };

        debug!("Uploading error log");
        if let Err(err) = self
            .ports
            .channel
            .upload_diagnostic_blob(body.into_bytes(), &self.config.diagnostic_filename)
            .await
        {
            warn!(error = %err, "Error log upload failed");
        }
    }

    async fn transition(&self, message: Option<&str>) -> FinalizerResult<FinalizeOutcome> {
        let action = &self.options.continue_with;
        let flags = self.state.flags();

        if let ContinueAction::Unrecognized(raw) = action {
            if flags.is_finished() {
                debug!("Already finished component, ignoring transition");
                return Ok(FinalizeOutcome::AlreadyFinished);
            }
            error!(continue_with = %raw, "Continue value not handled");
            return Ok(FinalizeOutcome::Unhandled(raw.clone()));
        }

        if !flags.try_finish() {
            debug!("Already finished component, ignoring transition");
            return Ok(FinalizeOutcome::AlreadyFinished);
        }

        let success = self.options.success_flag;
        let lifecycle = &self.ports.lifecycle;
        let result = match action {
            ContinueAction::EndSession => lifecycle.end_session(success, message),
            ContinueAction::EndOnly => lifecycle.end_session_only(success, message).await,
            ContinueAction::RedirectTo(url) => {
                lifecycle.end_session_and_redirect(url, success, message)
            }
            ContinueAction::AdvanceDefault => lifecycle.advance_to_next(message),
            ContinueAction::JumpToComponent(id) => lifecycle.jump_to_component(id, message),
            ContinueAction::JumpToPosition(pos) => lifecycle.jump_to_position(*pos, message),
            ContinueAction::Skip | ContinueAction::Unrecognized(_) => {
                return Ok(FinalizeOutcome::Skipped)
            }
        };

        if let Err(err) = result {
            flags.release_finish();
            return Err(err.into());
        }

        info!(continue_with = %action, message = message.unwrap_or(""), "Component finished");
        Ok(FinalizeOutcome::Transitioned(action.clone()))
    }
}
