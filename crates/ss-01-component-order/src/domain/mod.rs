//! Domain layer for component ordering
//!
//! Pure functions over the order spec and the platform roster. Nothing here
//! performs I/O or logs.

pub mod errors;
pub mod order_spec;
pub mod resolved;
pub mod resolver;
pub mod roster_check;
pub mod walk;

pub use errors::{ConfigError, OrderResult};
pub use order_spec::{NamedOrdering, OrderSpec};
pub use resolved::{OrderSelection, ResolvedNext};
pub use resolver::{resolve, resolve_next, select_order_code, Resolution, ResolveRequest};
pub use roster_check::cross_validate;
pub use walk::{walk_ordering, NextUuid, OrderWalk};
