//! Runtime orchestrator: artifact gating, checkpoints, reset and handoff.
//!
//! Every operation mutates the session in memory and then persists it
//! through the [`SessionStore`]. Precondition failures are detected before
//! any write, so a rejected operation leaves the stored record untouched.

use std::path::{Path, PathBuf};

use serde::Serialize;

use sw_domain::error::{Error, Result};
use sw_domain::process::ProcessDefinition;
use sw_domain::session::{Session, SessionState};
use sw_domain::trace::TraceEvent;

use crate::handoff::{self, HandoffKind};
use crate::store::SessionStore;

/// Snapshot returned by [`Runtime::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub id: String,
    pub process_name: String,
    pub state: SessionState,
    pub missing_artifacts: Vec<String>,
    pub history: Vec<String>,
    pub pending_decision: bool,
}

impl From<&Session> for SessionStatus {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            process_name: s.process_name.clone(),
            state: s.state,
            missing_artifacts: s.missing_artifacts.clone(),
            history: s.history.clone(),
            pending_decision: s.pending_decision,
        }
    }
}

pub struct Runtime {
    store: SessionStore,
    handoffs_dir: PathBuf,
}

impl Runtime {
    pub fn new(store: SessionStore, handoffs_dir: &Path) -> Self {
        Self {
            store,
            handoffs_dir: handoffs_dir.to_path_buf(),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn load(&self, session_id: &str) -> Result<Session> {
        self.store.load(session_id)
    }

    pub fn status(&self, session_id: &str) -> Result<SessionStatus> {
        Ok(SessionStatus::from(&self.store.load(session_id)?))
    }

    /// Create a session for `process`, gated on which required artifacts
    /// already exist under `workspace`.
    pub fn start(&self, process: &ProcessDefinition, workspace: &Path) -> Result<Session> {
        let missing = missing_artifacts(&process.required_artifacts, workspace);
        let session = self.store.create(process, missing)?;
        tracing::info!(
            session_id = %session.id,
            process = %session.process_name,
            state = %session.state,
            "session started"
        );
        Ok(session)
    }

    /// Re-check artifacts; stay in AWAITING_INPUT with the remaining list or
    /// move to RUNNING when nothing is missing.
    pub fn resume_after_input(&self, mut session: Session, workspace: &Path) -> Result<Session> {
        let missing = missing_artifacts(&session.required_artifacts, workspace);
        if missing.is_empty() {
            session.mark_running();
        } else {
            session.mark_awaiting_input(missing);
        }
        self.persist(&session, "resume")?;
        Ok(session)
    }

    pub fn reset_step(&self, mut session: Session, step_id: &str) -> Result<Session> {
        if !session.can_reset(step_id) {
            return Err(Error::StepNotFound(step_id.to_string()));
        }
        session.reset_to(step_id)?;
        self.persist(&session, "reset")?;
        Ok(session)
    }

    pub fn mark_decision(&self, mut session: Session, decision: &str) -> Result<Session> {
        if session.state != SessionState::AwaitingDecision {
            return Err(Error::NoPendingDecision {
                state: session.state.to_string(),
            });
        }
        session.register_decision(decision);
        self.persist(&session, "decide")?;
        Ok(session)
    }

    /// Append a step to the session history.
    pub fn record_step(&self, mut session: Session, step_id: &str) -> Result<Session> {
        session.add_step(step_id);
        self.persist(&session, "step")?;
        Ok(session)
    }

    /// Stop at a human checkpoint until a decision is registered.
    pub fn await_decision(&self, mut session: Session) -> Result<Session> {
        session.mark_awaiting_decision();
        self.persist(&session, "checkpoint")?;
        Ok(session)
    }

    /// Pause and write a handoff document; returns its path.
    pub fn pause(&self, mut session: Session) -> Result<PathBuf> {
        session.mark_paused();
        self.persist(&session, "pause")?;
        handoff::write(&self.handoffs_dir, &session, HandoffKind::Pause)
    }

    /// Complete and write the final handoff document; returns its path.
    pub fn complete(&self, mut session: Session) -> Result<PathBuf> {
        session.mark_completed();
        self.persist(&session, "complete")?;
        handoff::write(&self.handoffs_dir, &session, HandoffKind::Complete)
    }

    fn persist(&self, session: &Session, operation: &str) -> Result<()> {
        self.store.update(session)?;
        TraceEvent::SessionTransition {
            session_id: session.id.clone(),
            operation: operation.to_string(),
            state: session.state.to_string(),
        }
        .emit();
        Ok(())
    }
}

/// Required artifacts absent under `workspace`, in declaration order.
pub fn missing_artifacts(required: &[String], workspace: &Path) -> Vec<String> {
    required
        .iter()
        .filter(|rel| !workspace.join(rel).exists())
        .cloned()
        .collect()
}
