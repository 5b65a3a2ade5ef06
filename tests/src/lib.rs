//! # Session Engine Test Suite
//!
//! Cross-subsystem flows, run against the in-memory platform.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── order_flows.rs      # study config → next component → transition
//!     └── finalize_flows.rs   # trials → encryption → finalize → platform
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ss-tests
//! cargo test -p ss-tests integration::order_flows
//! ```

pub mod integration;
