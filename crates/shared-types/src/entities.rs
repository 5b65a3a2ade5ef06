//! # Core Domain Entities
//!
//! The study roster as reported by the hosting platform.
//!
//! ## Clusters
//!
//! - **Roster**: `ComponentId`, `ComponentDescriptor`, `Roster`
//! - **Execution context**: `ExecutionMode`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: THE ROSTER
// =============================================================================

/// Platform identifier of a study component.
///
/// Platforms report either numeric ids or string ids; both are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentId {
    /// Numeric component id.
    Numeric(i64),
    /// String component id.
    Named(String),
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentId::Numeric(id) => write!(f, "{id}"),
            ComponentId::Named(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ComponentId {
    fn from(id: i64) -> Self {
        ComponentId::Numeric(id)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        ComponentId::Named(id.to_string())
    }
}

/// One step of the study, as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Platform id used by jump calls.
    pub id: ComponentId,
    /// Stable uuid. Older platform versions do not report one.
    #[serde(default)]
    pub uuid: Option<String>,
    /// Whether the component takes part in the study.
    pub active: bool,
    /// 1-based position in the platform's own listing.
    pub position: u32,
}

impl ComponentDescriptor {
    /// Create an active descriptor.
    pub fn new(id: impl Into<ComponentId>, uuid: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            uuid: Some(uuid.into()),
            active: true,
            position,
        }
    }

    /// Mark the descriptor inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Ordered component listing owned by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<ComponentDescriptor>);

impl Roster {
    /// Wrap a platform listing.
    pub fn new(components: Vec<ComponentDescriptor>) -> Self {
        Self(components)
    }

    /// All descriptors in platform order.
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.0
    }

    /// First descriptor in platform order.
    pub fn first(&self) -> Option<&ComponentDescriptor> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest position among active components.
    pub fn last_active_position(&self) -> Option<u32> {
        self.0
            .iter()
            .filter(|c| c.active)
            .map(|c| c.position)
            .max()
    }

    /// Whether `position` is at or past the last active component.
    pub fn is_last_component(&self, position: u32) -> bool {
        self.last_active_position()
            .map(|last| position >= last)
            .unwrap_or(false)
    }

    /// Find the descriptor carrying `uuid`.
    pub fn find_by_uuid(&self, uuid: &str) -> Option<&ComponentDescriptor> {
        self.0.iter().find(|c| c.uuid.as_deref() == Some(uuid))
    }
}

impl From<Vec<ComponentDescriptor>> for Roster {
    fn from(components: Vec<ComponentDescriptor>) -> Self {
        Self::new(components)
    }
}

// =============================================================================
// CLUSTER B: EXECUTION CONTEXT
// =============================================================================

/// Who is running the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// A real participant run.
    #[default]
    Participant,
    /// The platform's own preview/operator run.
    Operator,
}
