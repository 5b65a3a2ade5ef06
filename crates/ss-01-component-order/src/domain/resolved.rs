//! Outcome of next-component resolution.

use shared_types::ComponentId;

/// What should run after the current component.
///
/// Computed once per session and cached by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedNext {
    /// Jump to this component.
    Component(ComponentId),
    /// Current component is last in the custom order.
    End,
    /// No custom order applies; use the platform's default sequencing.
    Absent,
}

impl ResolvedNext {
    /// Whether a custom order is in effect.
    pub fn is_custom(&self) -> bool {
        !matches!(self, ResolvedNext::Absent)
    }
}

/// Order code chosen for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSelection {
    /// Explicitly requested code.
    Requested(String),
    /// Operator run without a code; first declared ordering used.
    DefaultedToFirst(String),
    /// Escape hatch: keep the platform's natural order.
    Ignore,
}
