//! Error types for component ordering
//!
//! Every variant is fatal to order resolution: once a study declares a custom
//! order, any inconsistency is surfaced instead of falling back silently.

use shared_types::ComponentId;
use thiserror::Error;

/// Malformed or inconsistent order specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `order` map missing or not an object
    #[error("Malformed order spec in study config (order parameter missing)")]
    MissingOrderings,

    /// `uuid` map missing or not an object
    #[error("Malformed order spec in study config (uuid parameter missing)")]
    MissingUuidMap,

    /// Participant run without an order code
    #[error("No order parameter supplied, but study config contains custom order(s)")]
    NoOrderParameter,

    /// Operator run, but the spec declares no ordering to default to
    #[error("Study config declares no custom orders")]
    NoOrderings,

    /// Requested order code not declared
    #[error("Order '{code}' not found in study config")]
    UnknownOrder { code: String },

    /// Declared ordering is not a list of ids
    #[error("Order '{code}' is not a list of component ids")]
    MalformedOrder { code: String },

    /// Ordering references a local id with no uuid binding
    #[error("UUID not found for id {local_id} used by order {code}")]
    UnresolvedLocalId { local_id: String, code: String },

    /// Same component listed twice in one ordering
    #[error("Component uuid {uuid} appears more than once in order {code}")]
    DuplicateOrderEntry { uuid: String, code: String },

    /// Running component is not part of the selected ordering
    #[error("Did not find current component UUID {uuid} in list for order {code}")]
    CurrentNotInOrder { uuid: String, code: String },

    /// Platform reported no components
    #[error("Component list is empty")]
    EmptyRoster,

    /// Ordering does not start where the platform starts
    #[error("The first uuid in custom order was not found in first entry of component list (expected uuid {expected})")]
    FirstComponentMismatch { expected: String },

    /// Custom orders need every component active
    #[error("Component id {id} is not active, but all components must be active when a custom order is in use")]
    InactiveComponent { id: ComponentId },

    /// Platform did not report a uuid for a component
    #[error("No uuid found in component list for component id {id}")]
    MissingRosterUuid { id: ComponentId },

    /// Roster component left out of the ordering
    #[error("Component found in component list but not in order; id={id} uuid={uuid}")]
    ComponentNotInOrder { id: ComponentId, uuid: String },

    /// Ordering entry with no roster component
    #[error("Component uuid included in order, but not found in component list: {uuid}")]
    OrphanedOrderEntry { uuid: String },

    /// Successor uuid did not map to a roster id
    #[error("Component id for next component not found; searched for uuid {uuid}")]
    NextComponentNotFound { uuid: String },
}

/// Result type for ordering operations
pub type OrderResult<T> = Result<T, ConfigError>;
