//! Results — the unit written back for every request — and step outcomes.

use serde::Serialize;

use crate::error::EncodingError;
use crate::request::ReservationRequest;

/// Outcome of one request, written as exactly one output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationResult {
    message: String,
    is_error: bool,
}

impl ReservationResult {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }

    /// Success for a completed step sequence.
    ///
    /// The sequence stops at the restaurant page, so the message says that
    /// booking still needs further steps.
    #[must_use]
    pub fn first_result_selected(request: &ReservationRequest) -> Self {
        Self::success(format!(
            "Successfully selected the first restaurant for \"{}\" on {}. Further steps needed.",
            request.search_term(),
            request.date()
        ))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Encode as a single JSON line (without the trailing newline):
    /// `{"content":[{"type":"text","text":"…"}],"isError":false}`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if serialization fails.
    pub fn encode(&self) -> Result<String, EncodingError> {
        let wire = WireResult {
            content: [WireContent::Text {
                text: &self.message,
            }],
            is_error: self.is_error,
        };
        Ok(serde_json::to_string(&wire)?)
    }
}

#[derive(Serialize)]
struct WireResult<'a> {
    content: [WireContent<'a>; 1],
    #[serde(rename = "isError")]
    is_error: bool,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContent<'a> {
    Text { text: &'a str },
}

/// Outcome of a single step, kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: &'static str,
    pub succeeded: bool,
    pub detail: String,
}

impl StepResult {
    #[must_use]
    pub fn passed(step: &'static str, detail: impl Into<String>) -> Self {
        Self {
            step,
            succeeded: true,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn failed(step: &'static str, detail: impl Into<String>) -> Self {
        Self {
            step,
            succeeded: false,
            detail: detail.into(),
        }
    }
}
