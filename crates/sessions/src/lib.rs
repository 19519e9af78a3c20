//! Session runtime for stepwise.
//!
//! Persists sessions as one YAML record per id, drives them through the
//! artifact/decision state machine, and writes handoff documents on pause
//! and completion.

pub mod handoff;
pub mod runtime;
pub mod store;
pub mod vcs;

pub use handoff::HandoffKind;
pub use runtime::{Runtime, SessionStatus};
pub use store::SessionStore;
pub use vcs::GitCommitter;
