//! Automation port — the browser automation capability.
//!
//! The capability is opaque: it opens a page, navigates, and carries out
//! natural-language instructions. Every call is fallible and may suspend for
//! as long as the remote side takes to answer. There is no timeout here; a
//! hung backend stalls the caller.

use std::future::Future;
use std::time::Duration;

use tablebot_domain::credentials::Credentials;
use tablebot_domain::error::AutomationError;
use tablebot_domain::id::SessionId;

/// Factory for automation sessions.
///
/// Implementations live in adapter crates (e.g. `adapter_bridge`).
pub trait AutomationBackend: Send + Sync {
    /// The session type this backend hands out.
    type Session: AutomationSession;

    /// Unique name identifying this backend (e.g. `"bridge"`).
    fn name(&self) -> &'static str;

    /// Create a fresh, uninitialized session.
    ///
    /// No external resource may be acquired here; that happens in
    /// [`AutomationSession::init`].
    fn open_session(&self, id: SessionId, credentials: &Credentials) -> Self::Session;
}

/// One exclusive automation session, used for exactly one step sequence.
///
/// The controller calls the lifecycle methods in order:
///
/// 1. [`init`](Self::init) — acquire the external resource
/// 2. [`goto`](Self::goto) / [`act`](Self::act) / [`settle`](Self::settle) — the steps
/// 3. [`close`](Self::close) — release, only if `init` succeeded
pub trait AutomationSession: Send {
    /// Connect to the automation capability.
    fn init(&mut self) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Navigate the page to `url`.
    fn goto(&mut self, url: &str) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Carry out a natural-language instruction on the current page.
    fn act(
        &mut self,
        instruction: &str,
    ) -> impl Future<Output = Result<(), AutomationError>> + Send;

    /// Wait for the page to settle, for at most `ceiling`.
    ///
    /// The default waits the full ceiling. Backends that can observe
    /// readiness override this with a bounded poll.
    fn settle(
        &mut self,
        ceiling: Duration,
    ) -> impl Future<Output = Result<(), AutomationError>> + Send {
        async move {
            tokio::time::sleep(ceiling).await;
            Ok(())
        }
    }

    /// Release the external resource. Consumes the session.
    fn close(self) -> impl Future<Output = Result<(), AutomationError>> + Send
    where
        Self: Sized;
}
