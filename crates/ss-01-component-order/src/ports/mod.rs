//! Ports module for component ordering
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::ComponentOrderApi;
pub use outbound::RosterProvider;
