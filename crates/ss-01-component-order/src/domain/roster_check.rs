//! Cross-validation of a walked ordering against the platform roster.
//!
//! Invariants enforced:
//! - the roster's first component is the ordering's first component
//! - every roster component is active and carries a uuid
//! - used uuids and roster uuids are the same set

use super::errors::{ConfigError, OrderResult};
use super::resolved::ResolvedNext;
use super::walk::{NextUuid, OrderWalk};
use shared_types::Roster;

/// Validate `walk` against `roster` and map the successor uuid to a roster id.
pub fn cross_validate(roster: &Roster, mut walk: OrderWalk) -> OrderResult<ResolvedNext> {
    let first = roster.first().ok_or(ConfigError::EmptyRoster)?;
    if first.uuid.as_deref() != Some(walk.first.as_str()) {
        return Err(ConfigError::FirstComponentMismatch {
            expected: walk.first,
        });
    }

    let mut next_id = None;
    for component in roster.components() {
        if !component.active {
            return Err(ConfigError::InactiveComponent {
                id: component.id.clone(),
            });
        }
        let uuid = component
            .uuid
            .as_deref()
            .ok_or_else(|| ConfigError::MissingRosterUuid {
                id: component.id.clone(),
            })?;

        let count = walk
            .used
            .get_mut(uuid)
            .ok_or_else(|| ConfigError::ComponentNotInOrder {
                id: component.id.clone(),
                uuid: uuid.to_string(),
            })?;
        *count += 1;

        if matches!(&walk.next, NextUuid::Uuid(next) if next == uuid) {
            next_id = Some(component.id.clone());
        }
    }

    if let Some((orphan, _)) = walk.used.iter().find(|(_, count)| **count == 0) {
        return Err(ConfigError::OrphanedOrderEntry {
            uuid: orphan.clone(),
        });
    }

    match walk.next {
        NextUuid::End => Ok(ResolvedNext::End),
        NextUuid::Uuid(uuid) => next_id
            .map(ResolvedNext::Component)
            .ok_or(ConfigError::NextComponentNotFound { uuid }),
    }
}
