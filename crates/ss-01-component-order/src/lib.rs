//! # SS-01: Component Order Subsystem
//!
//! Resolves, once per session, which study component runs after the current
//! one when study authors declare a custom order.
//!
//! ## Architecture
//!
//! - **Domain**: Order spec parsing, reverse walk, roster cross-validation
//! - **Ports**: Inbound (ComponentOrderApi) and Outbound (RosterProvider)
//! - **Service**: Session-start orchestration and logging
//!
//! ```text
//! study config ──OrderSpec──┐
//! query string ──order code─┼──→ resolve ──→ ResolvedNext (cached by caller)
//! platform ──────Roster─────┘
//! ```

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::OrderConfig;
pub use domain::errors::{ConfigError, OrderResult};
pub use domain::order_spec::OrderSpec;
pub use domain::resolved::{OrderSelection, ResolvedNext};
pub use domain::resolver::{resolve_next, ResolveRequest, IGNORE_CODE};
pub use ports::inbound::ComponentOrderApi;
pub use ports::outbound::RosterProvider;
pub use service::ComponentOrderService;
