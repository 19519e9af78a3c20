//! Session entity and its state machine.
//!
//! A session is one run of a process definition. State changes go through
//! the `mark_*` / `register_decision` / `reset_to` methods, which keep two
//! invariants: `pending_decision` is set exactly while the session awaits a
//! decision, and `missing_artifacts` is only populated while it awaits
//! input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// History entries with this prefix record a human decision.
pub const DECISION_PREFIX: &str = "decision:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Running,
    AwaitingInput,
    AwaitingDecision,
    Paused,
    Completed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Running => "RUNNING",
            SessionState::AwaitingInput => "AWAITING_INPUT",
            SessionState::AwaitingDecision => "AWAITING_DECISION",
            SessionState::Paused => "PAUSED",
            SessionState::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One workflow instance. Serialises to the flat on-disk record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub process_name: String,
    pub state: SessionState,
    #[serde(default)]
    pub required_artifacts: Vec<String>,
    #[serde(default)]
    pub missing_artifacts: Vec<String>,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub pending_decision: bool,
}

impl Session {
    /// A fresh RUNNING session with empty history.
    pub fn new(id: impl Into<String>, process_name: impl Into<String>, required: Vec<String>) -> Self {
        Self {
            id: id.into(),
            process_name: process_name.into(),
            state: SessionState::Running,
            required_artifacts: required,
            missing_artifacts: Vec::new(),
            history: Vec::new(),
            pending_decision: false,
        }
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.pending_decision = state == SessionState::AwaitingDecision;
        if state != SessionState::AwaitingInput {
            self.missing_artifacts.clear();
        }
    }

    pub fn mark_awaiting_input(&mut self, missing: Vec<String>) {
        self.set_state(SessionState::AwaitingInput);
        self.missing_artifacts = missing;
    }

    pub fn mark_running(&mut self) {
        self.set_state(SessionState::Running);
    }

    pub fn mark_awaiting_decision(&mut self) {
        self.set_state(SessionState::AwaitingDecision);
    }

    /// Append `decision:<value>` and return to RUNNING. The caller checks
    /// that a decision was actually pending.
    pub fn register_decision(&mut self, decision: &str) {
        self.history.push(format!("{DECISION_PREFIX}{decision}"));
        self.set_state(SessionState::Running);
    }

    pub fn add_step(&mut self, step_id: impl Into<String>) {
        self.history.push(step_id.into());
    }

    pub fn can_reset(&self, step_id: &str) -> bool {
        self.history.iter().any(|h| h == step_id)
    }

    /// Truncate history after the first occurrence of `step_id` and return
    /// to RUNNING. Entries after that point, decisions included, are dropped.
    pub fn reset_to(&mut self, step_id: &str) -> Result<()> {
        let idx = self
            .history
            .iter()
            .position(|h| h == step_id)
            .ok_or_else(|| Error::StepNotFound(step_id.to_string()))?;
        self.history.truncate(idx + 1);
        self.set_state(SessionState::Running);
        Ok(())
    }

    pub fn mark_paused(&mut self) {
        self.set_state(SessionState::Paused);
    }

    pub fn mark_completed(&mut self) {
        self.set_state(SessionState::Completed);
    }

    /// History entries that are steps, in order.
    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.history
            .iter()
            .map(String::as_str)
            .filter(|h| !h.starts_with(DECISION_PREFIX))
    }

    /// Recorded decision values with the prefix stripped, in order.
    pub fn decisions(&self) -> impl Iterator<Item = &str> {
        self.history
            .iter()
            .filter_map(|h| h.strip_prefix(DECISION_PREFIX))
    }
}
