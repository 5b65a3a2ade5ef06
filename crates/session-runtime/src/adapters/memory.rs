//! # In-Memory Platform
//!
//! Stands in for the hosting platform: serves the roster, study and
//! component configuration and query parameters, keeps session variables,
//! and records every lifecycle and data-channel call.
//!
//! The platform honours at most one terminal transition per session, as the
//! real one does; later calls are rejected.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared_types::{ComponentId, ExecutionMode, Roster, SessionStore};
use ss_01_component_order::RosterProvider;
use ss_03_session_finalizer::{DataChannel, PlatformLifecycle, TransportError, TransportResult};
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::{debug, info};

/// Terminal transition as seen by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleCall {
    Advance {
        message: Option<String>,
    },
    JumpToComponent {
        id: ComponentId,
        message: Option<String>,
    },
    JumpToPosition {
        position: u32,
        message: Option<String>,
    },
    End {
        success: bool,
        message: Option<String>,
        follow_up: bool,
    },
    Redirect {
        url: String,
        success: bool,
        message: Option<String>,
    },
}

#[derive(Debug, Default)]
struct Transmissions {
    submitted: Vec<String>,
    appended: Vec<String>,
    uploads: Vec<(String, Vec<u8>)>,
}

/// In-memory hosting platform.
pub struct InMemoryPlatform {
    roster: Roster,
    study_config: Value,
    component_config: Value,
    current_uuid: Option<String>,
    position: u32,
    mode: ExecutionMode,
    query: HashMap<String, String>,
    study_result_id: Option<String>,
    component_result_id: Option<String>,
    session_vars: RwLock<HashMap<String, Value>>,
    transitions: Mutex<Vec<LifecycleCall>>,
    transmissions: Mutex<Transmissions>,
    reject_submit: Mutex<Option<String>>,
    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
}

impl InMemoryPlatform {
    /// Platform at `position` of `roster`, ready immediately.
    pub fn new(roster: Roster, position: u32) -> Self {
        let current_uuid = roster
            .components()
            .iter()
            .find(|c| c.position == position)
            .and_then(|c| c.uuid.clone());
        let (ready_tx, ready_rx) = watch::channel(true);

        Self {
            roster,
            study_config: Value::Null,
            component_config: Value::Null,
            current_uuid,
            position,
            mode: ExecutionMode::Participant,
            query: HashMap::new(),
            study_result_id: None,
            component_result_id: None,
            session_vars: RwLock::new(HashMap::new()),
            transitions: Mutex::new(Vec::new()),
            transmissions: Mutex::new(Transmissions::default()),
            reject_submit: Mutex::new(None),
            ready_tx,
            ready_rx,
        }
    }

    pub fn with_study_config(mut self, config: Value) -> Self {
        self.study_config = config;
        self
    }

    pub fn with_component_config(mut self, config: Value) -> Self {
        self.component_config = config;
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_result_ids(
        mut self,
        study_result_id: impl Into<String>,
        component_result_id: impl Into<String>,
    ) -> Self {
        self.study_result_id = Some(study_result_id.into());
        self.component_result_id = Some(component_result_id.into());
        self
    }

    /// Start not ready; `ready()` blocks until [`Self::signal_ready`].
    pub fn not_ready(self) -> Self {
        self.ready_tx.send_replace(false);
        self
    }

    pub fn signal_ready(&self) {
        self.ready_tx.send_replace(true);
    }

    /// Reject full submissions with `reason` from now on.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        *self.reject_submit.lock() = Some(reason.into());
    }

    pub fn transitions(&self) -> Vec<LifecycleCall> {
        self.transitions.lock().clone()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.transmissions.lock().submitted.clone()
    }

    pub fn appended(&self) -> Vec<String> {
        self.transmissions.lock().appended.clone()
    }

    /// Uploaded files as `(filename, body)`.
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.transmissions
            .lock()
            .uploads
            .iter()
            .map(|(name, bytes)| (name.clone(), String::from_utf8_lossy(bytes).into_owned()))
            .collect()
    }

    fn transition(&self, call: LifecycleCall) -> TransportResult<()> {
        let mut transitions = self.transitions.lock();
        if !transitions.is_empty() {
            return Err(TransportError::Rejected {
                operation: "transition",
                reason: "session already left this component".to_string(),
            });
        }
        info!(call = ?call, "Platform transition");
        transitions.push(call);
        Ok(())
    }
}

#[async_trait]
impl PlatformLifecycle for InMemoryPlatform {
    async fn ready(&self) {
        let mut rx = self.ready_rx.clone();
        // sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|ready| *ready).await;
    }

    fn advance_to_next(&self, message: Option<&str>) -> TransportResult<()> {
        self.transition(LifecycleCall::Advance {
            message: message.map(str::to_string),
        })
    }

    fn jump_to_component(&self, id: &ComponentId, message: Option<&str>) -> TransportResult<()> {
        self.transition(LifecycleCall::JumpToComponent {
            id: id.clone(),
            message: message.map(str::to_string),
        })
    }

    fn jump_to_position(&self, position: u32, message: Option<&str>) -> TransportResult<()> {
        self.transition(LifecycleCall::JumpToPosition {
            position,
            message: message.map(str::to_string),
        })
    }

    fn end_session(&self, success: bool, message: Option<&str>) -> TransportResult<()> {
        self.transition(LifecycleCall::End {
            success,
            message: message.map(str::to_string),
            follow_up: true,
        })
    }

    async fn end_session_only(&self, success: bool, message: Option<&str>) -> TransportResult<()> {
        self.transition(LifecycleCall::End {
            success,
            message: message.map(str::to_string),
            follow_up: false,
        })
    }

    fn end_session_and_redirect(
        &self,
        url: &str,
        success: bool,
        message: Option<&str>,
    ) -> TransportResult<()> {
        self.transition(LifecycleCall::Redirect {
            url: url.to_string(),
            success,
            message: message.map(str::to_string),
        })
    }
}

#[async_trait]
impl DataChannel for InMemoryPlatform {
    async fn submit_full_payload(&self, text: String) -> TransportResult<()> {
        if let Some(reason) = self.reject_submit.lock().clone() {
            return Err(TransportError::Rejected {
                operation: "submitResultData",
                reason,
            });
        }
        debug!(bytes = text.len(), "Result data submitted");
        self.transmissions.lock().submitted.push(text);
        Ok(())
    }

    async fn append_payload(&self, text: String) -> TransportResult<()> {
        debug!(bytes = text.len(), "Result data appended");
        self.transmissions.lock().appended.push(text);
        Ok(())
    }

    async fn upload_diagnostic_blob(&self, bytes: Vec<u8>, filename: &str) -> TransportResult<()> {
        debug!(filename, bytes = bytes.len(), "File uploaded");
        self.transmissions
            .lock()
            .uploads
            .push((filename.to_string(), bytes));
        Ok(())
    }
}

impl SessionStore for InMemoryPlatform {
    fn get_var(&self, key: &str) -> Option<Value> {
        self.session_vars.read().get(key).cloned()
    }

    fn set_var(&self, key: &str, value: Value) {
        self.session_vars.write().insert(key.to_string(), value);
    }
}

impl RosterProvider for InMemoryPlatform {
    fn component_list(&self) -> Roster {
        self.roster.clone()
    }

    fn study_config(&self) -> Value {
        self.study_config.clone()
    }

    fn component_config(&self) -> Value {
        self.component_config.clone()
    }

    fn current_component_uuid(&self) -> Option<String> {
        self.current_uuid.clone()
    }

    fn current_component_position(&self) -> u32 {
        self.position
    }

    fn query_parameter(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }

    fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    fn study_result_id(&self) -> Option<String> {
        self.study_result_id.clone()
    }

    fn component_result_id(&self) -> Option<String> {
        self.component_result_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ComponentDescriptor;
    use std::sync::Arc;
    use std::time::Duration;

    fn roster() -> Roster {
        Roster::new(vec![
            ComponentDescriptor::new(1, "u1", 1),
            ComponentDescriptor::new(2, "u2", 2),
        ])
    }

    #[test]
    fn test_current_uuid_from_position() {
        let platform = InMemoryPlatform::new(roster(), 2);
        assert_eq!(platform.current_component_uuid(), Some("u2".into()));
        assert_eq!(InMemoryPlatform::new(roster(), 9).current_component_uuid(), None);
    }

    #[test]
    fn test_single_transition() {
        let platform = InMemoryPlatform::new(roster(), 1);
        platform.advance_to_next(None).unwrap();
        assert!(platform.end_session(true, None).is_err());
        assert_eq!(
            platform.transitions(),
            vec![LifecycleCall::Advance { message: None }]
        );
    }

    #[tokio::test]
    async fn test_ready_waits_for_signal() {
        let platform = Arc::new(InMemoryPlatform::new(roster(), 1).not_ready());
        let waiter = {
            let platform = Arc::clone(&platform);
            tokio::spawn(async move { platform.ready().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        platform.signal_ready();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_submission() {
        let platform = InMemoryPlatform::new(roster(), 1);
        platform.reject_submissions("quota exceeded");
        assert!(platform.submit_full_payload("[]".into()).await.is_err());
        assert!(platform.submitted().is_empty());
    }
}
