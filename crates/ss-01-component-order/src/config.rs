//! Configuration for component ordering

use crate::domain::resolver::IGNORE_CODE;
use serde::{Deserialize, Serialize};

/// Where the custom order lives and how it is selected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Study-config key holding the order spec
    pub spec_key: String,
    /// Query parameter carrying the requested order code
    pub order_parameter: String,
    /// Order code that disables the custom order
    pub ignore_code: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            spec_key: "otputil_order".to_string(),
            order_parameter: "order".to_string(),
            ignore_code: IGNORE_CODE.to_string(),
        }
    }
}
