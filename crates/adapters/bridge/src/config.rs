//! Bridge driver configuration.

use serde::Deserialize;

/// How to launch the automation driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Driver executable, resolved through `PATH`.
    pub command: String,
    /// Extra arguments passed to the driver.
    pub args: Vec<String>,
    /// Model name the driver hands to its LLM provider.
    pub model: String,
    /// How long a driver may take to exit after answering `close` before
    /// it is killed.
    pub exit_grace_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: "stagehand-bridge".to_string(),
            args: Vec::new(),
            model: "claude-3-5-sonnet-latest".to_string(),
            exit_grace_ms: 5000,
        }
    }
}
