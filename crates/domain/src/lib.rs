//! Shared types for stepwise: errors, trace events, configuration, the
//! session state machine and process definitions.

pub mod config;
pub mod error;
pub mod process;
pub mod session;
pub mod trace;

pub use error::{Error, ManifestError, Result};
pub use process::ProcessDefinition;
pub use session::{Session, SessionState};
