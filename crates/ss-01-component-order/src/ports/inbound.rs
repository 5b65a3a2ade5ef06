//! Inbound Ports (Driving Ports / API)

use super::outbound::RosterProvider;
use crate::domain::errors::OrderResult;
use crate::domain::resolved::ResolvedNext;
use crate::domain::resolver::ResolveRequest;

/// Primary component ordering API
pub trait ComponentOrderApi: Send + Sync {
    /// Resolve the next component from explicit inputs.
    ///
    /// Pure: the same request always yields the same result.
    fn resolve_next(&self, request: &ResolveRequest<'_>) -> OrderResult<ResolvedNext>;

    /// Resolve the next component from what the platform reports.
    ///
    /// This is the session-start entry point. It:
    /// 1. Reads the order spec from the study configuration
    /// 2. Reads the requested order code from the query string
    /// 3. Resolves against the live roster
    ///
    /// Callers cache the result for the rest of the session.
    fn resolve_for(&self, provider: &dyn RosterProvider) -> OrderResult<ResolvedNext>;
}
