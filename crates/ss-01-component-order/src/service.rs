//! Component Order Service
//!
//! Main service implementing ComponentOrderApi.

use crate::config::OrderConfig;
use crate::domain::errors::OrderResult;
use crate::domain::order_spec::OrderSpec;
use crate::domain::resolved::{OrderSelection, ResolvedNext};
use crate::domain::resolver::{self, Resolution, ResolveRequest};
use crate::ports::inbound::ComponentOrderApi;
use crate::ports::outbound::RosterProvider;

use tracing::{debug, error, info, warn};

/// Component Order Service
///
/// Orchestrates session-start resolution:
/// 1. Extract the order spec from the study configuration
/// 2. Select the order code
/// 3. Walk and cross-validate
/// 4. Report the successor
pub struct ComponentOrderService {
    config: OrderConfig,
}

impl ComponentOrderService {
    /// Create a new service with default config
    pub fn new() -> Self {
        Self {
            config: OrderConfig::default(),
        }
    }

    /// Create a new service with custom config
    pub fn with_config(config: OrderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    fn log_resolution(&self, resolution: &Resolution) {
        match &resolution.selection {
            None => debug!("No custom order in study config"),
            Some(OrderSelection::Ignore) => {
                info!(order_code = %self.config.ignore_code, "Custom order ignored")
            }
            Some(OrderSelection::DefaultedToFirst(code)) => warn!(
                order_code = %code,
                "No order parameter in operator run, defaulting to first custom order"
            ),
            Some(OrderSelection::Requested(code)) => {
                debug!(order_code = %code, "Using requested custom order")
            }
        }

        match &resolution.next {
            ResolvedNext::Component(id) => info!(next_component = %id, "Resolved next component"),
            ResolvedNext::End => info!("Current component is last in custom order"),
            ResolvedNext::Absent => {}
        }
    }
}

impl Default for ComponentOrderService {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentOrderApi for ComponentOrderService {
    fn resolve_next(&self, request: &ResolveRequest<'_>) -> OrderResult<ResolvedNext> {
        let resolution = resolver::resolve(request).inspect_err(|e| {
            error!(error = %e, "Custom order resolution failed");
        })?;
        self.log_resolution(&resolution);
        Ok(resolution.next)
    }

    fn resolve_for(&self, provider: &dyn RosterProvider) -> OrderResult<ResolvedNext> {
        let spec = OrderSpec::from_study_config(&provider.study_config(), &self.config.spec_key)
            .inspect_err(|e| error!(error = %e, "Malformed custom order"))?;

        let roster = provider.component_list();
        let current_uuid = provider.current_component_uuid().unwrap_or_default();
        let requested = provider.query_parameter(&self.config.order_parameter);

        let mut request = ResolveRequest::new(spec.as_ref(), &roster, &current_uuid)
            .with_mode(provider.execution_mode())
            .with_ignore_code(&self.config.ignore_code);
        if let Some(code) = requested.as_deref() {
            request = request.with_code(code);
        }

        self.resolve_next(&request)
    }
}
