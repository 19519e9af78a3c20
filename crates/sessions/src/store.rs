//! File-backed session store.
//!
//! Each session is one YAML record at `<sessions_dir>/<id>.yml` holding
//! exactly the fields of [`Session`]. Writes replace the whole record; there
//! is no locking, so concurrent writers to the same id race and the last
//! one wins.

use std::path::{Path, PathBuf};

use sw_domain::error::{Error, Result};
use sw_domain::process::ProcessDefinition;
use sw_domain::session::Session;
use sw_domain::trace::TraceEvent;

use crate::vcs::GitCommitter;

const RECORD_EXT: &str = "yml";

pub struct SessionStore {
    base_dir: PathBuf,
    committer: Option<GitCommitter>,
}

impl SessionStore {
    /// Open (creating if needed) the store rooted at `base_dir`.
    pub fn new(base_dir: &Path, auto_commit: bool) -> Result<Self> {
        std::fs::create_dir_all(base_dir)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            committer: auto_commit.then(|| GitCommitter::new(base_dir)),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn record_path(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.{RECORD_EXT}"))
    }

    /// Allocate an id, build a session and persist it. A non-empty `missing`
    /// list starts the session in AWAITING_INPUT, otherwise RUNNING.
    pub fn create(&self, process: &ProcessDefinition, missing: Vec<String>) -> Result<Session> {
        let mut session = Session::new(
            new_session_id(),
            process.name.clone(),
            process.required_artifacts.clone(),
        );
        if !missing.is_empty() {
            session.mark_awaiting_input(missing);
        }
        self.save(&session)?;

        TraceEvent::SessionCreated {
            session_id: session.id.clone(),
            process_name: session.process_name.clone(),
            state: session.state.to_string(),
            missing_artifacts: session.missing_artifacts.len(),
        }
        .emit();

        Ok(session)
    }

    /// Overwrite the persisted record with the full in-memory session.
    pub fn update(&self, session: &Session) -> Result<()> {
        self.save(session)
    }

    pub fn load(&self, session_id: &str) -> Result<Session> {
        if !is_valid_session_id(session_id) {
            return Err(Error::SessionNotFound(session_id.to_string()));
        }
        let path = self.record_path(session_id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SessionNotFound(session_id.to_string()));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let session: Session = serde_yaml::from_str(&raw)?;
        Ok(session)
    }

    /// Ids of every persisted session, sorted.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn save(&self, session: &Session) -> Result<()> {
        let path = self.record_path(&session.id);
        let yaml = serde_yaml::to_string(session)?;
        std::fs::write(&path, yaml)?;

        TraceEvent::SessionPersisted {
            session_id: session.id.clone(),
            path: path.display().to_string(),
        }
        .emit();

        if let Some(committer) = &self.committer {
            committer.commit(
                &path,
                &format!("[stepwise] session {} -> {}", session.id, session.state),
            );
        }
        Ok(())
    }
}

/// Eight lowercase hex characters.
fn new_session_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Ids are used as file names; anything that could escape the directory is
/// treated as unknown.
fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
