//! # tablebot-adapter-virtual
//!
//! Simulated automation backend for dry runs and end-to-end tests.
//!
//! Sessions never touch a browser and never sleep: every call is logged
//! and answered immediately. A backend built with
//! [`VirtualBackend::recording`] also appends each call to a journal shared
//! by all of its sessions. Instructions containing the configured failing
//! pattern are rejected, which lets callers rehearse step failures.
//!
//! ## Dependency rule
//!
//! Depends on `tablebot-app` (port traits) and `tablebot-domain` only.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tablebot_app::ports::{AutomationBackend, AutomationSession};
use tablebot_domain::credentials::Credentials;
use tablebot_domain::error::AutomationError;
use tablebot_domain::id::SessionId;
use tracing::info;

/// A call received by a virtual session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualCall {
    Init,
    Goto(String),
    Act(String),
    Settle(Duration),
    Close,
}

/// Automation backend whose sessions only record what they are asked to do.
#[derive(Debug, Clone, Default)]
pub struct VirtualBackend {
    journal: Option<Arc<Mutex<Vec<(SessionId, VirtualCall)>>>>,
    failing_pattern: Option<String>,
}

impl VirtualBackend {
    /// A backend keeping every call in memory, see [`Self::calls`].
    #[must_use]
    pub fn recording() -> Self {
        Self {
            journal: Some(Arc::default()),
            ..Self::default()
        }
    }

    /// Reject every instruction that contains `pattern`.
    #[must_use]
    pub fn failing_on(mut self, pattern: impl Into<String>) -> Self {
        self.failing_pattern = Some(pattern.into());
        self
    }

    /// Every call received so far, across sessions, in order.
    ///
    /// Always empty unless the backend was built with [`Self::recording`].
    #[must_use]
    pub fn calls(&self) -> Vec<(SessionId, VirtualCall)> {
        self.journal.as_ref().map_or_else(Vec::new, |journal| {
            journal
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }
}

impl AutomationBackend for VirtualBackend {
    type Session = VirtualSession;

    fn name(&self) -> &'static str {
        "virtual"
    }

    fn open_session(&self, id: SessionId, _credentials: &Credentials) -> VirtualSession {
        VirtualSession {
            id,
            backend: self.clone(),
        }
    }
}

/// A simulated session.
#[derive(Debug)]
pub struct VirtualSession {
    id: SessionId,
    backend: VirtualBackend,
}

impl VirtualSession {
    fn record(&self, call: VirtualCall) {
        info!(session_id = %self.id, ?call, "virtual automation call");
        if let Some(journal) = &self.backend.journal {
            journal
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((self.id, call));
        }
    }
}

impl AutomationSession for VirtualSession {
    async fn init(&mut self) -> Result<(), AutomationError> {
        self.record(VirtualCall::Init);
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> Result<(), AutomationError> {
        self.record(VirtualCall::Goto(url.to_string()));
        Ok(())
    }

    async fn act(&mut self, instruction: &str) -> Result<(), AutomationError> {
        self.record(VirtualCall::Act(instruction.to_string()));
        match &self.backend.failing_pattern {
            Some(pattern) if instruction.contains(pattern.as_str()) => Err(
                AutomationError::Failed(format!("no element matches \"{instruction}\"")),
            ),
            _ => Ok(()),
        }
    }

    async fn settle(&mut self, ceiling: Duration) -> Result<(), AutomationError> {
        self.record(VirtualCall::Settle(ceiling));
        Ok(())
    }

    async fn close(self) -> Result<(), AutomationError> {
        self.record(VirtualCall::Close);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tablebot_domain::credentials::{
        AUTOMATION_API_KEY_VAR, AUTOMATION_PROJECT_ID_VAR, LLM_API_KEY_VAR,
    };

    use super::*;

    fn credentials() -> Credentials {
        Credentials::resolve(|key| {
            [LLM_API_KEY_VAR, AUTOMATION_API_KEY_VAR, AUTOMATION_PROJECT_ID_VAR]
                .contains(&key)
                .then(|| "test".to_string())
        })
        .unwrap()
    }

    fn kinds(backend: &VirtualBackend) -> Vec<VirtualCall> {
        backend.calls().into_iter().map(|(_, call)| call).collect()
    }

    #[test]
    fn should_return_virtual_as_name() {
        assert_eq!(VirtualBackend::default().name(), "virtual");
    }

    #[tokio::test]
    async fn should_record_every_call_in_order() {
        let backend = VirtualBackend::recording();
        let mut session = backend.open_session(SessionId::new(), &credentials());

        session.init().await.unwrap();
        session.goto("https://www.opentable.com").await.unwrap();
        session.act("Click on the region picker").await.unwrap();
        session.settle(Duration::from_millis(500)).await.unwrap();
        session.close().await.unwrap();

        assert_eq!(
            kinds(&backend),
            vec![
                VirtualCall::Init,
                VirtualCall::Goto("https://www.opentable.com".to_string()),
                VirtualCall::Act("Click on the region picker".to_string()),
                VirtualCall::Settle(Duration::from_millis(500)),
                VirtualCall::Close,
            ]
        );
    }

    #[tokio::test]
    async fn should_not_wait_out_settle_ceiling() {
        let backend = VirtualBackend::default();
        let mut session = backend.open_session(SessionId::new(), &credentials());
        let started = std::time::Instant::now();
        session.settle(Duration::from_secs(60)).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn should_fail_instructions_matching_pattern() {
        let backend = VirtualBackend::default().failing_on("Find a table");
        let mut session = backend.open_session(SessionId::new(), &credentials());

        session.act("Click on the region picker").await.unwrap();
        let err = session.act("Click the 'Find a table' button").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "no element matches \"Click the 'Find a table' button\""
        );
    }

    #[tokio::test]
    async fn should_not_record_unless_asked() {
        let backend = VirtualBackend::default();
        let mut session = backend.open_session(SessionId::new(), &credentials());

        session.init().await.unwrap();
        session.act("Click on the region picker").await.unwrap();
        session.close().await.unwrap();

        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn should_keep_recording_when_also_failing() {
        let backend = VirtualBackend::recording().failing_on("Find a table");
        let mut session = backend.open_session(SessionId::new(), &credentials());

        session.act("Click the 'Find a table' button").await.unwrap_err();

        assert_eq!(
            kinds(&backend),
            vec![VirtualCall::Act("Click the 'Find a table' button".to_string())]
        );
    }

    #[tokio::test]
    async fn should_tag_calls_with_their_session() {
        let backend = VirtualBackend::recording();
        let first = SessionId::new();
        let second = SessionId::new();

        backend.open_session(first, &credentials()).init().await.unwrap();
        backend.open_session(second, &credentials()).init().await.unwrap();

        let sessions: Vec<SessionId> = backend.calls().into_iter().map(|(id, _)| id).collect();
        assert_eq!(sessions, vec![first, second]);
    }
}
