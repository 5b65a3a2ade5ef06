//! Outbound Ports (Driven Ports / SPI)

use serde_json::Value;
use shared_types::{ExecutionMode, Roster};

/// What the hosting platform knows about the running study.
///
/// Values are available synchronously once the platform signalled ready.
pub trait RosterProvider: Send + Sync {
    /// Components in platform order.
    fn component_list(&self) -> Roster;

    /// Study-level JSON input. Holds the optional order spec.
    fn study_config(&self) -> Value;

    /// Component-level JSON input.
    fn component_config(&self) -> Value {
        Value::Null
    }

    /// Uuid of the running component, if the platform reports one.
    fn current_component_uuid(&self) -> Option<String>;

    /// 1-based position of the running component.
    fn current_component_position(&self) -> u32;

    /// URL query parameter of the study run.
    fn query_parameter(&self, name: &str) -> Option<String>;

    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Participant
    }

    fn study_result_id(&self) -> Option<String> {
        None
    }

    fn component_result_id(&self) -> Option<String> {
        None
    }
}
