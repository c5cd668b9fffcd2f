//! Session controller — one request, one automation session, one step sequence.
//!
//! State machine per request:
//!
//! ```text
//! Idle → Initializing → Ready → Executing(1) → … → Executing(n) → Done
//!                  │                       │
//!                  └→ Failed               └→ Failed
//! Done | Failed → Closing → Closed          (only when Ready was reached)
//! ```
//!
//! Credentials are resolved before a session is created; when any is
//! missing the run ends in `Idle`. A session that failed to initialize is
//! dropped without `close`. A session that reached `Ready` is always closed,
//! and a close failure never changes the outcome.

use std::fmt;

use tablebot_domain::credentials::Credentials;
use tablebot_domain::error::{AutomationError, ReservationError, SessionCloseError, StepExecutionError};
use tablebot_domain::id::SessionId;
use tablebot_domain::plan::{Pacing, SiteProfile, StepAction, StepPlan};
use tablebot_domain::request::ReservationRequest;
use tablebot_domain::result::{ReservationResult, StepResult};
use tablebot_domain::time::{INVALID_DATE_LABEL, day_label};
use tracing::{debug, error, info, warn};

use crate::ports::{AutomationBackend, AutomationSession, CredentialSource};

/// Lifecycle state of the session serving one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Initializing,
    Ready,
    /// Running the given step (1-based).
    Executing { step: usize },
    Done,
    Failed,
    Closing,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Initializing => f.write_str("initializing"),
            Self::Ready => f.write_str("ready"),
            Self::Executing { step } => write!(f, "executing({step})"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
            Self::Closing => f.write_str("closing"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: Result<ReservationResult, ReservationError>,
    /// Every state entered, in order, starting with [`SessionState::Idle`].
    pub states: Vec<SessionState>,
    /// Outcome of every step attempted, including a failed `init`.
    pub steps: Vec<StepResult>,
}

impl RunReport {
    /// The result to write back, success or error.
    #[must_use]
    pub fn into_result(self) -> ReservationResult {
        match self.outcome {
            Ok(result) => result,
            Err(err) => err.to_result(),
        }
    }
}

/// Drives a single automation session through the step plan.
pub struct SessionController<B, C> {
    backend: B,
    credentials: C,
    site: SiteProfile,
    pacing: Pacing,
}

impl<B, C> SessionController<B, C>
where
    B: AutomationBackend,
    C: CredentialSource,
{
    /// Create a controller over the given backend and credential source.
    pub fn new(backend: B, credentials: C, site: SiteProfile, pacing: Pacing) -> Self {
        Self {
            backend,
            credentials,
            site,
            pacing,
        }
    }

    /// The automation backend sessions are opened on.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serve one validated request from start to close.
    ///
    /// Never fails: every error is carried in [`RunReport::outcome`].
    pub async fn run(&self, request: &ReservationRequest) -> RunReport {
        let mut run = Run::new();
        let outcome = self.drive(request, &mut run).await;
        RunReport {
            outcome,
            states: run.states,
            steps: run.steps,
        }
    }

    async fn drive(
        &self,
        request: &ReservationRequest,
        run: &mut Run,
    ) -> Result<ReservationResult, ReservationError> {
        let credentials = Credentials::resolve(|key| self.credentials.lookup(key))
            .inspect_err(|err| warn!(error = %err, "credentials missing, no session created"))?;

        let label = day_label(request.date()).unwrap_or_else(|err| {
            warn!(error = %err, label = INVALID_DATE_LABEL, "cannot render date, using sentinel label");
            INVALID_DATE_LABEL.to_string()
        });
        let plan = StepPlan::for_request(request, &self.site, &self.pacing, &label);

        let session_id = SessionId::new();
        let mut session = self.backend.open_session(session_id, &credentials);
        info!(%session_id, backend = self.backend.name(), steps = plan.len(), "initializing session");
        run.enter(SessionState::Initializing);
        if let Err(source) = session.init().await {
            error!(%session_id, error = %source, "session init failed");
            run.steps.push(StepResult::failed("init", source.to_string()));
            run.enter(SessionState::Failed);
            return Err(self.step_error(request, "init", source).into());
        }
        run.enter(SessionState::Ready);

        let executed = execute(&mut session, &plan, run).await;
        run.enter(if executed.is_ok() {
            SessionState::Done
        } else {
            SessionState::Failed
        });

        run.enter(SessionState::Closing);
        if let Err(source) = session.close().await {
            let err = SessionCloseError(source);
            warn!(%session_id, error = %err, cause = %err.0, "ignoring session close failure");
        }
        run.enter(SessionState::Closed);

        match executed {
            Ok(()) => {
                info!(%session_id, "step sequence completed");
                Ok(ReservationResult::first_result_selected(request))
            }
            Err(failure) => Err(self.step_error(request, failure.step, failure.source).into()),
        }
    }

    fn step_error(
        &self,
        request: &ReservationRequest,
        step: &'static str,
        source: AutomationError,
    ) -> StepExecutionError {
        StepExecutionError {
            site_name: self.site.name.clone(),
            region: request.region().to_string(),
            step,
            source,
        }
    }
}

struct StepFailure {
    step: &'static str,
    source: AutomationError,
}

/// Run every step in order, stopping at the first failure. No retries.
async fn execute<S: AutomationSession>(
    session: &mut S,
    plan: &StepPlan,
    run: &mut Run,
) -> Result<(), StepFailure> {
    for (index, step) in plan.steps().iter().enumerate() {
        run.enter(SessionState::Executing { step: index + 1 });
        let outcome = match &step.action {
            StepAction::Goto(url) => session.goto(url).await,
            StepAction::Act(instruction) => session.act(instruction).await,
            StepAction::Settle(ceiling) => session.settle(*ceiling).await,
            StepAction::Skip(reason) => {
                info!(step = step.name, %reason, "skipping step");
                run.steps
                    .push(StepResult::passed(step.name, format!("skipped: {reason}")));
                continue;
            }
        };

        match outcome {
            Ok(()) => {
                info!(step = step.name, action = %step.action, "step succeeded");
                run.steps
                    .push(StepResult::passed(step.name, step.action.to_string()));
            }
            Err(source) => {
                error!(step = step.name, action = %step.action, error = %source, "step failed, aborting sequence");
                run.steps
                    .push(StepResult::failed(step.name, source.to_string()));
                return Err(StepFailure {
                    step: step.name,
                    source,
                });
            }
        }
    }
    Ok(())
}

/// Bookkeeping for one run.
struct Run {
    states: Vec<SessionState>,
    steps: Vec<StepResult>,
}

impl Run {
    fn new() -> Self {
        Self {
            states: vec![SessionState::Idle],
            steps: Vec::new(),
        }
    }

    fn enter(&mut self, state: SessionState) {
        debug!(%state, "session state");
        self.states.push(state);
    }
}
