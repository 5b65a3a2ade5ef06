//! # Session Identity and Flags
//!
//! A session spans one component run. Its id tags partial-data envelopes so
//! repeated partial submissions can be correlated as one collection.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Length of the random suffix appended to the platform result id.
pub const SESSION_SUFFIX_LEN: usize = 8;

/// Opaque session identifier: `<resultId>-<suffix>` or just `<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a fresh id, prefixed with the platform result id when present.
    pub fn generate(result_id: Option<&str>) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_SUFFIX_LEN)
            .map(char::from)
            .collect();

        match result_id {
            Some(prefix) => Self(format!("{prefix}-{suffix}")),
            None => Self(suffix),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-wide flags shared by every finisher of the session.
///
/// `finished` is sticky once a terminal transition went through. A claim is
/// only given back when the platform call itself failed.
#[derive(Debug, Default)]
pub struct SessionFlags {
    finished: AtomicBool,
    sent_full_payload: AtomicBool,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the terminal transition. Returns `false` if already claimed.
    pub fn try_finish(&self) -> bool {
        self.finished
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Give back a claim whose platform call failed.
    pub fn release_finish(&self) {
        self.finished.store(false, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn mark_full_payload_sent(&self) {
        self.sent_full_payload.store(true, Ordering::Release);
    }

    pub fn full_payload_sent(&self) -> bool {
        self.sent_full_payload.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_with_prefix() {
        let id = SessionId::generate(Some("1234"));
        let (prefix, suffix) = id.as_str().split_once('-').unwrap();
        assert_eq!(prefix, "1234");
        assert_eq!(suffix.len(), SESSION_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_session_id_without_prefix() {
        let id = SessionId::generate(None);
        assert_eq!(id.as_str().len(), SESSION_SUFFIX_LEN);
        assert!(!id.as_str().contains('-'));
    }

    #[test]
    fn test_finish_is_claimed_once() {
        let flags = SessionFlags::new();
        assert!(!flags.is_finished());
        assert!(flags.try_finish());
        assert!(!flags.try_finish());
        assert!(flags.is_finished());

        flags.release_finish();
        assert!(flags.try_finish());
    }
}
