//! # tablebotd — tablebot daemon
//!
//! Composition root that wires an automation backend to the line protocol.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the log subscriber on stderr (stdout carries results only)
//! - Construct the configured automation backend (adapter)
//! - Construct the session controller and line dispatcher, injecting the
//!   backend and the process environment via port traits
//! - Serve stdin until end-of-input
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use tablebot_adapter_bridge::BridgeBackend;
use tablebot_adapter_virtual::VirtualBackend;
use tablebot_app::environment::ProcessEnvironment;
use tablebot_app::ports::AutomationBackend;
use tablebot_app::services::dispatcher::LineDispatcher;
use tablebot_app::services::session_controller::SessionController;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::config::{Backend, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_logging(&config.logging.filter);

    match config.automation.backend {
        Backend::Bridge => serve(BridgeBackend::new(config.bridge.clone()), &config).await?,
        Backend::Virtual => serve(VirtualBackend::default(), &config).await?,
    }

    Ok(())
}

fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("tablebotd: invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

async fn serve<B: AutomationBackend>(
    backend: B,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        backend = backend.name(),
        site = %config.automation.site_url,
        queue_capacity = config.dispatcher.queue_capacity,
        "tablebotd serving on stdio"
    );

    let controller = SessionController::new(
        backend,
        ProcessEnvironment,
        config.site_profile(),
        config.pacing(),
    );
    let dispatcher = LineDispatcher::new(controller, config.dispatcher.queue_capacity);
    dispatcher
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    tracing::info!("end of input, shutting down");
    Ok(())
}
