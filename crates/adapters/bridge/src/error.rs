//! Bridge adapter error types.

use tablebot_domain::error::AutomationError;

/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Errors specific to the bridge adapter.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The driver process could not be started.
    #[error("failed to spawn driver `{command}`")]
    Spawn {
        /// Executable that was launched.
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A stdio pipe of the driver was not captured.
    #[error("driver {0} is not piped")]
    MissingPipe(&'static str),

    /// Reading from or writing to the driver failed.
    #[error("driver i/o failed")]
    Io(#[source] std::io::Error),

    /// A request could not be serialized.
    #[error("failed to encode driver request")]
    Encode(#[source] serde_json::Error),

    /// The driver wrote a line that is not a JSON-RPC message.
    #[error("unparsable driver line: {line}")]
    Decode {
        /// The offending line.
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// The driver answered with an error object.
    #[error("{message}")]
    Remote {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the driver.
        message: String,
    },

    /// The driver closed its stdout before answering.
    #[error("driver closed its output")]
    Closed,

    /// A step was requested before `init` succeeded.
    #[error("driver not started")]
    NotStarted,
}

impl BridgeError {
    /// Whether the driver does not implement the requested method.
    #[must_use]
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Remote { code, .. } if *code == METHOD_NOT_FOUND)
    }
}

impl From<BridgeError> for AutomationError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Remote { message, .. } => Self::Failed(message),
            other => Self::Unavailable(Box::new(other)),
        }
    }
}
