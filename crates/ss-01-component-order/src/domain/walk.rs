//! Single reverse pass over the selected ordering.
//!
//! Scanning from the end keeps one accumulator for "the uuid right after the
//! scan position"; when the scan meets the current component, that value is
//! its successor (or `End` if nothing follows). The pass continues to the
//! start to record the ordering's first uuid and the full used-uuid set.

use super::errors::{ConfigError, OrderResult};
use super::order_spec::OrderSpec;
use std::collections::BTreeMap;

/// Successor of the current component within the ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextUuid {
    Uuid(String),
    End,
}

/// Result of walking one ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWalk {
    /// Every uuid named by the ordering, with a visit count (initially zero).
    pub used: BTreeMap<String, u32>,
    /// Uuid of the ordering's first entry.
    pub first: String,
    /// Successor of the current component.
    pub next: NextUuid,
    /// Position of the current component within the ordering.
    pub current_index: usize,
}

/// Walk `code`'s entries from end to start, locating `current_uuid`.
pub fn walk_ordering(
    spec: &OrderSpec,
    code: &str,
    entries: &[String],
    current_uuid: &str,
) -> OrderResult<OrderWalk> {
    let mut used = BTreeMap::new();
    let mut following: Option<&str> = None;
    let mut located: Option<(usize, NextUuid)> = None;

    for (i, local_id) in entries.iter().enumerate().rev() {
        let uuid = spec
            .uuid_of(local_id)
            .ok_or_else(|| ConfigError::UnresolvedLocalId {
                local_id: local_id.clone(),
                code: code.to_string(),
            })?;

        if used.insert(uuid.to_string(), 0).is_some() {
            return Err(ConfigError::DuplicateOrderEntry {
                uuid: uuid.to_string(),
                code: code.to_string(),
            });
        }

        if uuid == current_uuid {
            let next = match following {
                Some(after) => NextUuid::Uuid(after.to_string()),
                None => NextUuid::End,
            };
            located = Some((i, next));
        }

        following = Some(uuid);
    }

    let not_found = || ConfigError::CurrentNotInOrder {
        uuid: current_uuid.to_string(),
        code: code.to_string(),
    };
    // after the pass, `following` holds the first entry
    let first = following.ok_or_else(not_found)?.to_string();
    let (current_index, next) = located.ok_or_else(not_found)?;

    Ok(OrderWalk {
        used,
        first,
        next,
        current_index,
    })
}
