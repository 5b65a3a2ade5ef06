//! Finalize options, as study authors write them.
//!
//! ```json
//! {
//!   "addInteractionEvents": true,
//!   "sendResults": "append",
//!   "continue": { "component": 4 },
//!   "message": ["group=B", "done"],
//!   "successFlag": true
//! }
//! ```
//!
//! Legacy `jatos*` key names are accepted as aliases.

use crate::domain::continue_action::ContinueAction;
use crate::domain::send_mode::SendMode;
use serde::{Deserialize, Deserializer, Serialize};

/// Options of one finalizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinalizeOptions {
    /// Append the interaction-event record to the payload
    pub add_interaction_events: bool,
    #[serde(rename = "sendResults", alias = "jatosSendResults")]
    pub send_mode: SendMode,
    #[serde(rename = "continue", alias = "jatosContinue")]
    pub continue_with: ContinueAction,
    /// Messages sent after the run-time ones
    #[serde(alias = "jatosMessage", deserialize_with = "one_or_many")]
    pub message: Vec<String>,
    /// Passed to the platform when the session ends
    #[serde(alias = "jatosSuccessfulFlag")]
    pub success_flag: bool,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            add_interaction_events: true,
            send_mode: SendMode::SubmitOnce,
            continue_with: ContinueAction::AdvanceDefault,
            message: Vec::new(),
            success_flag: true,
        }
    }
}

impl FinalizeOptions {
    pub fn with_continue(mut self, action: ContinueAction) -> Self {
        self.continue_with = action;
        self
    }

    pub fn with_send_mode(mut self, mode: SendMode) -> Self {
        self.send_mode = mode;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message.push(message.into());
        self
    }

    pub fn without_interaction_events(mut self) -> Self {
        self.add_interaction_events = false;
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        None(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(message) => vec![message],
        OneOrMany::Many(messages) => messages,
        OneOrMany::None(()) => Vec::new(),
    })
}
