//! Replacement of an encrypted trial record.

use shared_types::TrialRecord;
use serde_json::Value;

/// Bookkeeping fields that survive encryption.
pub const RETAINED_FIELDS: [&str; 4] = ["trial_type", "trial_index", "time_elapsed", "internal_node_id"];

/// Field holding the armored ciphertext.
pub const ENCRYPTED_DATA_FIELD: &str = "encryptedData";

/// Build the replacement for `original`: retained fields plus the ciphertext.
pub fn redact(original: &TrialRecord, ciphertext: String) -> TrialRecord {
    let mut replacement: TrialRecord = original
        .iter()
        .filter(|(field, _)| RETAINED_FIELDS.contains(&field.as_str()))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    replacement.insert(ENCRYPTED_DATA_FIELD.to_string(), Value::String(ciphertext));
    replacement
}
