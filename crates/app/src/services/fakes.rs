//! Hand-written fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tablebot_domain::credentials::{
    AUTOMATION_API_KEY_VAR, AUTOMATION_PROJECT_ID_VAR, Credentials, LLM_API_KEY_VAR,
};
use tablebot_domain::error::AutomationError;
use tablebot_domain::id::SessionId;

use crate::ports::{AutomationBackend, AutomationSession};

/// A call received by a [`FakeSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    Goto(String),
    Act(String),
    Settle(Duration),
    Close,
}

/// Everything the fake backend observed, shared with the test.
#[derive(Debug, Default)]
pub struct Journal {
    pub opened: AtomicUsize,
    pub calls: Mutex<Vec<Call>>,
    /// A session is between a successful `init` and its `close`.
    pub ready: AtomicBool,
    /// `init` was called while another session was ready.
    pub overlaps: AtomicUsize,
}

impl Journal {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    pub fn acts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Act(instruction) => Some(instruction),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Scriptable automation backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub journal: Arc<Journal>,
    pub fail_init: bool,
    pub fail_close: bool,
    /// Fail the n-th `act` call of a session (1-based).
    pub fail_act: Option<usize>,
    /// Delay inside every `act`, to give concurrent callers a chance to interleave.
    pub act_delay: Option<Duration>,
}

impl AutomationBackend for FakeBackend {
    type Session = FakeSession;

    fn name(&self) -> &'static str {
        "fake"
    }

    fn open_session(&self, _id: SessionId, _credentials: &Credentials) -> FakeSession {
        self.journal.opened.fetch_add(1, Ordering::SeqCst);
        FakeSession {
            backend: self.clone(),
            acts: 0,
        }
    }
}

pub struct FakeSession {
    backend: FakeBackend,
    acts: usize,
}

impl AutomationSession for FakeSession {
    async fn init(&mut self) -> Result<(), AutomationError> {
        let journal = &self.backend.journal;
        journal.push(Call::Init);
        if self.backend.fail_init {
            return Err(AutomationError::Failed("browser session refused".to_string()));
        }
        if journal.ready.swap(true, Ordering::SeqCst) {
            journal.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> Result<(), AutomationError> {
        self.backend.journal.push(Call::Goto(url.to_string()));
        Ok(())
    }

    async fn act(&mut self, instruction: &str) -> Result<(), AutomationError> {
        self.backend.journal.push(Call::Act(instruction.to_string()));
        self.acts += 1;
        if let Some(delay) = self.backend.act_delay {
            tokio::time::sleep(delay).await;
        }
        if self.backend.fail_act == Some(self.acts) {
            return Err(AutomationError::Failed(format!(
                "no element matched instruction {}",
                self.acts
            )));
        }
        Ok(())
    }

    async fn settle(&mut self, ceiling: Duration) -> Result<(), AutomationError> {
        self.backend.journal.push(Call::Settle(ceiling));
        Ok(())
    }

    async fn close(self) -> Result<(), AutomationError> {
        let journal = &self.backend.journal;
        journal.push(Call::Close);
        journal.ready.store(false, Ordering::SeqCst);
        if self.backend.fail_close {
            return Err(AutomationError::Failed("session already gone".to_string()));
        }
        Ok(())
    }
}

/// Credential source with every required variable set.
pub fn full_credentials() -> HashMap<String, String> {
    [
        (LLM_API_KEY_VAR, "sk-test"),
        (AUTOMATION_API_KEY_VAR, "bb-test"),
        (AUTOMATION_PROJECT_ID_VAR, "project-test"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
