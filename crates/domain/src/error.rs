//! Error taxonomy shared across the workspace.
//!
//! [`ReservationError`] is the request-level error: each variant becomes
//! exactly one `isError: true` result line. The remaining types never reach
//! the output channel. They are recovered or logged where they occur.

use std::fmt;

use crate::credentials::LLM_API_KEY_VAR;
use crate::result::ReservationResult;

/// Everything that can turn a single request into an error result.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error(transparent)]
    MissingCredential(#[from] MissingCredentialError),

    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    StepExecution(#[from] StepExecutionError),
}

impl ReservationError {
    /// The error result written back for this request.
    #[must_use]
    pub fn to_result(&self) -> ReservationResult {
        ReservationResult::error(self.to_string())
    }
}

/// A credential required to open an automation session is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingCredentialError {
    #[error("Error: LLM API key ({var}) is not set in environment variables.", var = LLM_API_KEY_VAR)]
    LlmProvider,

    #[error("Error: Browserbase API key or Project ID is not set in environment variables.")]
    AutomationPlatform,
}

/// The input line is not a parseable JSON document, even after repair.
#[derive(Debug, thiserror::Error)]
#[error("Fatal error processing request: {source}. Raw input: {raw}")]
pub struct MalformedInputError {
    /// The line as received, before backtick repair.
    pub raw: String,
    pub source: serde_json::Error,
}

/// One or more request fields are missing or invalid.
///
/// Always carries every offending field, never just the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid input parameters: {}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    #[must_use]
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// Whether any issue concerns the given field path.
    #[must_use]
    pub fn concerns(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single problem with a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted field path; empty for the document root.
    pub path: String,
    pub reason: IssueReason,
}

impl FieldIssue {
    #[must_use]
    pub fn new(path: impl Into<String>, reason: IssueReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    #[must_use]
    pub fn root(reason: IssueReason) -> Self {
        Self::new(String::new(), reason)
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root) ({})", self.reason)
        } else {
            write!(f, "{} ({})", self.path, self.reason)
        }
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueReason {
    Required,
    ExpectedObject { received: JsonKind },
    ExpectedString { received: JsonKind },
    EmptyString,
    ExpectedNumber { received: JsonKind },
    ExpectedInteger,
    NotPositive,
    /// Larger than the biggest party size that can be represented.
    TooBig,
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::ExpectedObject { received } => write!(f, "Expected object, received {received}"),
            Self::ExpectedString { received } => write!(f, "Expected string, received {received}"),
            Self::EmptyString => f.write_str("String must contain at least 1 character(s)"),
            Self::ExpectedNumber { received } => write!(f, "Expected number, received {received}"),
            Self::ExpectedInteger => f.write_str("Expected integer, received float"),
            Self::NotPositive => f.write_str("Number must be greater than 0"),
            Self::TooBig => write!(f, "Number must be less than or equal to {}", u64::MAX),
        }
    }
}

/// Coarse JSON value kind, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    #[must_use]
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(_) => Self::Boolean,
            serde_json::Value::Number(_) => Self::Number,
            serde_json::Value::String(_) => Self::String,
            serde_json::Value::Array(_) => Self::Array,
            serde_json::Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

/// A failure reported by (or while talking to) the automation capability.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// The capability ran the call and reported that it failed.
    #[error("{0}")]
    Failed(String),

    /// The capability could not be reached, or stopped answering.
    #[error("automation backend unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A step (or the session `init`) failed and the sequence was aborted.
#[derive(Debug, thiserror::Error)]
#[error("Failed during {site_name} automation for region {region}. Error: {source}")]
pub struct StepExecutionError {
    pub site_name: String,
    pub region: String,
    /// Name of the step that failed (`init` when the session never became ready).
    pub step: &'static str,
    pub source: AutomationError,
}

/// Closing an initialized session failed. Logged, never surfaced.
#[derive(Debug, thiserror::Error)]
#[error("failed to close automation session")]
pub struct SessionCloseError(#[source] pub AutomationError);

/// A calendar date could not be parsed. Recovered with a sentinel label.
#[derive(Debug, thiserror::Error)]
#[error("invalid calendar date {input:?}")]
pub struct DateFormatError {
    pub input: String,
    pub source: chrono::ParseError,
}

/// A result could not be serialized. Reported on diagnostics only.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode result")]
pub struct EncodingError(#[from] pub serde_json::Error);
