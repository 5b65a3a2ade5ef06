//! Next-component resolution.
//!
//! 1. No spec: `Absent`.
//! 2. Pick the order code (explicit, operator default, or the ignore code).
//! 3. Walk the selected ordering from its end.
//! 4. Cross-validate the walk against the roster.

use super::errors::{ConfigError, OrderResult};
use super::order_spec::OrderSpec;
use super::resolved::{OrderSelection, ResolvedNext};
use super::roster_check::cross_validate;
use super::walk::walk_ordering;
use shared_types::{ExecutionMode, Roster};

/// Default escape-hatch order code.
pub const IGNORE_CODE: &str = "ignore";

/// Inputs of a single resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub spec: Option<&'a OrderSpec>,
    pub roster: &'a Roster,
    pub current_uuid: &'a str,
    pub requested_code: Option<&'a str>,
    pub mode: ExecutionMode,
    pub ignore_code: &'a str,
}

impl<'a> ResolveRequest<'a> {
    pub fn new(spec: Option<&'a OrderSpec>, roster: &'a Roster, current_uuid: &'a str) -> Self {
        Self {
            spec,
            roster,
            current_uuid,
            requested_code: None,
            mode: ExecutionMode::Participant,
            ignore_code: IGNORE_CODE,
        }
    }

    pub fn with_code(mut self, code: &'a str) -> Self {
        self.requested_code = Some(code);
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ignore_code(mut self, ignore_code: &'a str) -> Self {
        self.ignore_code = ignore_code;
        self
    }
}

/// Resolution result plus the order code that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `None` when the study declares no custom order.
    pub selection: Option<OrderSelection>,
    pub next: ResolvedNext,
}

/// Choose the order code for this run.
pub fn select_order_code(
    spec: &OrderSpec,
    requested: Option<&str>,
    mode: ExecutionMode,
    ignore_code: &str,
) -> OrderResult<OrderSelection> {
    match (requested, mode) {
        (Some(code), _) if code == ignore_code => Ok(OrderSelection::Ignore),
        (Some(code), _) => Ok(OrderSelection::Requested(code.to_string())),
        (None, ExecutionMode::Operator) => spec
            .first_code()
            .map(|code| OrderSelection::DefaultedToFirst(code.to_string()))
            .ok_or(ConfigError::NoOrderings),
        (None, ExecutionMode::Participant) => Err(ConfigError::NoOrderParameter),
    }
}

/// Resolve the next component and report which order code was used.
pub fn resolve(request: &ResolveRequest<'_>) -> OrderResult<Resolution> {
    let Some(spec) = request.spec else {
        return Ok(Resolution {
            selection: None,
            next: ResolvedNext::Absent,
        });
    };

    let selection = select_order_code(
        spec,
        request.requested_code,
        request.mode,
        request.ignore_code,
    )?;

    let code = match &selection {
        OrderSelection::Requested(code) | OrderSelection::DefaultedToFirst(code) => code.clone(),
        OrderSelection::Ignore => {
            return Ok(Resolution {
                selection: Some(OrderSelection::Ignore),
                next: ResolvedNext::Absent,
            })
        }
    };

    let entries = spec.ordering(&code)?;
    let walk = walk_ordering(spec, &code, entries, request.current_uuid)?;
    let next = cross_validate(request.roster, walk)?;

    Ok(Resolution {
        selection: Some(selection),
        next,
    })
}

/// Resolve the next component.
pub fn resolve_next(request: &ResolveRequest<'_>) -> OrderResult<ResolvedNext> {
    resolve(request).map(|resolution| resolution.next)
}
