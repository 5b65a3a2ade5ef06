//! Adapters connecting the session to a hosting platform.

pub mod memory;

pub use memory::{InMemoryPlatform, LifecycleCall};
