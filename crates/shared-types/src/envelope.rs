//! # Partial-Data Envelope
//!
//! Wire shape used when single trial records are appended before the full
//! payload is submitted:
//!
//! ```text
//! {"partialDataType":"arrayItem","collectionId":"<SessionId>","content":{..},"sequence":0,"start":true}
//! ```
//!
//! `start` is present only on the first envelope of a session and `sequence`
//! is unique within a `collectionId`.

use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Value of `partialDataType` for single-record envelopes.
pub const PARTIAL_DATA_TYPE_ARRAY_ITEM: &str = "arrayItem";

/// One partial submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialDataEnvelope {
    pub partial_data_type: String,
    pub collection_id: SessionId,
    pub content: Value,
    pub sequence: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<bool>,
}

impl PartialDataEnvelope {
    /// Serialise as one line of newline-delimited JSON.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Issues envelopes with increasing sequence numbers for one session.
#[derive(Debug)]
pub struct EnvelopeSequencer {
    collection_id: SessionId,
    next: AtomicU64,
}

impl EnvelopeSequencer {
    pub fn new(collection_id: SessionId) -> Self {
        Self {
            collection_id,
            next: AtomicU64::new(0),
        }
    }

    /// Wrap `content` in the next envelope.
    pub fn wrap(&self, content: Value) -> PartialDataEnvelope {
        let sequence = self.next.fetch_add(1, Ordering::AcqRel);
        PartialDataEnvelope {
            partial_data_type: PARTIAL_DATA_TYPE_ARRAY_ITEM.to_string(),
            collection_id: self.collection_id.clone(),
            content,
            sequence,
            start: (sequence == 0).then_some(true),
        }
    }

    /// Number of envelopes issued so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Acquire)
    }
}
