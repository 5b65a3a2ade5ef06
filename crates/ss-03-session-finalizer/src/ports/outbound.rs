//! Outbound Ports (Driven Ports / SPI)

use crate::error::{FinalizerResult, TransportResult};
use crate::service::SessionFinalizer;
use async_trait::async_trait;
use shared_types::ComponentId;

/// Platform calls that end the current component.
///
/// All but `end_session_only` hand control to the platform and return
/// immediately; the platform performs each of them at most once per session.
#[async_trait]
pub trait PlatformLifecycle: Send + Sync {
    /// Resolves once the platform is ready for calls.
    async fn ready(&self);

    fn advance_to_next(&self, message: Option<&str>) -> TransportResult<()>;

    fn jump_to_component(&self, id: &ComponentId, message: Option<&str>) -> TransportResult<()>;

    fn jump_to_position(&self, position: u32, message: Option<&str>) -> TransportResult<()>;

    fn end_session(&self, success: bool, message: Option<&str>) -> TransportResult<()>;

    /// End the session without the platform's follow-up callback.
    async fn end_session_only(&self, success: bool, message: Option<&str>) -> TransportResult<()>;

    fn end_session_and_redirect(
        &self,
        url: &str,
        success: bool,
        message: Option<&str>,
    ) -> TransportResult<()>;
}

/// Result data channel of the platform.
#[async_trait]
pub trait DataChannel: Send + Sync {
    /// Replace the component's result data.
    async fn submit_full_payload(&self, text: String) -> TransportResult<()>;

    /// Append to the component's result data.
    async fn append_payload(&self, text: String) -> TransportResult<()>;

    /// Upload a result file.
    async fn upload_diagnostic_blob(&self, bytes: Vec<u8>, filename: &str) -> TransportResult<()>;
}

/// Caller code run after the encryption barrier and before data collection.
///
/// Receives the finalizer so it can add messages or push awaits.
#[async_trait]
pub trait FinishHook: Send + Sync {
    async fn before_finish(&self, finalizer: &SessionFinalizer) -> FinalizerResult<()>;
}
