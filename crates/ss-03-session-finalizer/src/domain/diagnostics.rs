//! Buffered error log, uploaded to the platform as a result file.
//!
//! Each observed error becomes a block of lines:
//!
//! ```text
//! 2026-03-02T10:15:00.123Z ============
//! <environment>
//! errorEventClass: ErrorEvent
//! errorEventType: error
//! errorClass: TypeError
//! message: x is undefined
//! stack: ...
//! (not displayed)
//! ```

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;

/// Line budget of the buffer. A new error is only recorded while the buffer
/// holds fewer lines than this.
pub const MAX_LOG_LINES: usize = 100;

/// Result file name.
pub const DIAGNOSTIC_FILENAME: &str = "ERRORS.txt";

const HIDDEN_PREFIX: &str = "Batch channel";
const CROSS_ORIGIN_PREFIX: &str = "script error";

/// One error as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedError {
    pub event_class: String,
    pub event_type: String,
    pub error_class: String,
    pub message: String,
    pub stack: String,
    pub filename: Option<String>,
    pub lineno: Option<u32>,
}

impl ObservedError {
    pub fn new(error_class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_class: error_class.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, filename: impl Into<String>, lineno: u32) -> Self {
        self.filename = Some(filename.into());
        self.lineno = Some(lineno);
        self
    }

    /// Whether the error should be shown to the participant.
    ///
    /// Batch-channel noise and cross-origin script errors (line 0) carry no
    /// information and stay hidden.
    pub fn is_displayed(&self) -> bool {
        if self.message.starts_with(HIDDEN_PREFIX) {
            return false;
        }
        let cross_origin = self
            .message
            .get(..CROSS_ORIGIN_PREFIX.len())
            .map(|p| p.eq_ignore_ascii_case(CROSS_ORIGIN_PREFIX))
            .unwrap_or(false);
        !(cross_origin && self.lineno == Some(0))
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("errorEventClass", self.event_class.clone()),
            ("errorEventType", self.event_type.clone()),
            ("errorClass", self.error_class.clone()),
            ("message", self.message.clone()),
            ("stack", self.stack.clone()),
        ];
        if let Some(filename) = &self.filename {
            fields.push(("filename", filename.clone()));
        }
        if let Some(lineno) = self.lineno {
            fields.push(("lineno", lineno.to_string()));
        }
        fields
    }
}

/// What happened to an observed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Added to the buffer (false once the buffer is full)
    pub recorded: bool,
    pub displayed: bool,
}

/// Shared error buffer.
#[derive(Debug)]
pub struct DiagnosticLog {
    environment: String,
    lines: Mutex<Vec<String>>,
}

impl DiagnosticLog {
    /// `environment` is printed under every entry (user agent, host, ...).
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn observe(&self, error: &ObservedError) -> Observation {
        let displayed = error.is_displayed();
        let mut lines = self.lines.lock();
        if lines.len() >= MAX_LOG_LINES {
            return Observation {
                recorded: false,
                displayed,
            };
        }

        lines.push(format!(
            "{} ============",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
        lines.push(self.environment.clone());
        lines.extend(
            error
                .fields()
                .into_iter()
                .map(|(key, value)| format!("{key}: {value}")),
        );
        if !displayed {
            lines.push("(not displayed)".to_string());
        }

        Observation {
            recorded: true,
            displayed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.lock().len()
    }

    /// Upload body, or `None` when nothing was observed.
    pub fn render(
        &self,
        component_result_id: Option<&str>,
        study_result_id: Option<&str>,
    ) -> Option<String> {
        let lines = self.lines.lock();
        if lines.is_empty() {
            return None;
        }
        let header = [
            format!("componentResultId={}", component_result_id.unwrap_or("")),
            format!("studyResultId={}", study_result_id.unwrap_or("")),
        ];
        Some(
            header
                .iter()
                .chain(lines.iter())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(String::new())
    }
}
