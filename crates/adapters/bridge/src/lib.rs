//! # tablebot-adapter-bridge
//!
//! Browser automation backed by an external driver process.
//!
//! Every session spawns its own driver and talks to it with
//! newline-delimited JSON-RPC 2.0: requests on the driver's stdin, answers
//! on its stdout. The driver's stderr is inherited so its diagnostics end
//! up next to ours.
//!
//! | Method | Params |
//! |--------|--------|
//! | `init` | `{ "model", "modelApiKey", "apiKey", "projectId" }` |
//! | `goto` | `{ "url" }` |
//! | `act` | `{ "action" }` |
//! | `settle` | `{ "timeoutMs" }` (optional) |
//! | `close` | `{}` |
//!
//! A driver that answers `settle` with "method not found" gets a fixed
//! delay instead for the rest of the session. After `close` the driver's
//! stdin is closed and it gets `exit_grace_ms` to exit before being killed.
//!
//! ## Dependency rule
//!
//! Depends on `tablebot-app` (port traits) and `tablebot-domain` only.

pub mod config;
pub mod error;
pub mod rpc;

use std::process::Stdio;
use std::time::Duration;

use serde_json::{Value, json};
use tablebot_app::ports::{AutomationBackend, AutomationSession};
use tablebot_domain::credentials::Credentials;
use tablebot_domain::error::AutomationError;
use tablebot_domain::id::SessionId;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

pub use config::BridgeConfig;
pub use error::BridgeError;
use rpc::RpcChannel;

/// Automation backend spawning one driver process per session.
#[derive(Debug, Clone, Default)]
pub struct BridgeBackend {
    config: BridgeConfig,
}

impl BridgeBackend {
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl AutomationBackend for BridgeBackend {
    type Session = BridgeSession;

    fn name(&self) -> &'static str {
        "bridge"
    }

    fn open_session(&self, id: SessionId, credentials: &Credentials) -> BridgeSession {
        BridgeSession {
            id,
            config: self.config.clone(),
            init_params: json!({
                "model": self.config.model,
                "modelApiKey": credentials.llm_api_key(),
                "apiKey": credentials.automation_api_key(),
                "projectId": credentials.automation_project_id(),
            }),
            running: None,
        }
    }
}

/// One driver process, alive between a successful `init` and `close`.
pub struct BridgeSession {
    id: SessionId,
    config: BridgeConfig,
    init_params: Value,
    running: Option<(Child, Driver<BufReader<ChildStdout>, ChildStdin>)>,
}

impl BridgeSession {
    fn driver(&mut self) -> Result<&mut Driver<BufReader<ChildStdout>, ChildStdin>, BridgeError> {
        self.running
            .as_mut()
            .map(|(_, driver)| driver)
            .ok_or(BridgeError::NotStarted)
    }

    fn spawn(&self) -> Result<(Child, Driver<BufReader<ChildStdout>, ChildStdin>), BridgeError> {
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                command: self.config.command.clone(),
                source,
            })?;
        let stdin = child.stdin.take().ok_or(BridgeError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(BridgeError::MissingPipe("stdout"))?;
        debug!(session_id = %self.id, pid = child.id(), command = %self.config.command, "driver spawned");
        Ok((child, Driver::new(BufReader::new(stdout), stdin)))
    }
}

impl AutomationSession for BridgeSession {
    async fn init(&mut self) -> Result<(), AutomationError> {
        let (child, mut driver) = self.spawn()?;
        // on failure the child is dropped here and killed
        driver.rpc.call("init", self.init_params.clone()).await?;
        info!(session_id = %self.id, "driver session started");
        self.running = Some((child, driver));
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> Result<(), AutomationError> {
        self.driver()?.rpc.call("goto", json!({ "url": url })).await?;
        Ok(())
    }

    async fn act(&mut self, instruction: &str) -> Result<(), AutomationError> {
        self.driver()?
            .rpc
            .call("act", json!({ "action": instruction }))
            .await?;
        Ok(())
    }

    async fn settle(&mut self, ceiling: Duration) -> Result<(), AutomationError> {
        self.driver()?.settle(ceiling).await?;
        Ok(())
    }

    async fn close(mut self) -> Result<(), AutomationError> {
        let Some((mut child, mut driver)) = self.running.take() else {
            return Ok(());
        };
        let closed = driver.rpc.call("close", json!({})).await;
        if closed.is_err() {
            // the driver may be wedged, do not wait for it to exit on its own
            if let Err(err) = child.kill().await {
                warn!(session_id = %self.id, error = %err, "failed to kill driver");
            }
            closed?;
            return Ok(());
        }
        // dropping the driver closes its stdin, which is the driver's cue to exit
        drop(driver);
        let grace = Duration::from_millis(self.config.exit_grace_ms);
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => {
                let status = status.map_err(BridgeError::Io)?;
                debug!(session_id = %self.id, %status, "driver exited");
            }
            Err(_) => {
                warn!(session_id = %self.id, ?grace, "driver still running after close, killing it");
                child.kill().await.map_err(BridgeError::Io)?;
            }
        }
        Ok(())
    }
}

/// The RPC side of a running driver.
struct Driver<R, W> {
    rpc: RpcChannel<R, W>,
    settle_supported: bool,
}

impl<R, W> Driver<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    fn new(reader: R, writer: W) -> Self {
        Self {
            rpc: RpcChannel::new(reader, writer),
            settle_supported: true,
        }
    }

    async fn settle(&mut self, ceiling: Duration) -> Result<(), BridgeError> {
        if self.settle_supported {
            let timeout_ms = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
            match self
                .rpc
                .call("settle", json!({ "timeoutMs": timeout_ms }))
                .await
            {
                Ok(_) => return Ok(()),
                Err(err) if err.is_method_not_found() => {
                    info!("driver cannot report readiness, using fixed delays");
                    self.settle_supported = false;
                }
                Err(err) => return Err(err),
            }
        }
        tokio::time::sleep(ceiling).await;
        Ok(())
    }
}
