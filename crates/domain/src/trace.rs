use serde::Serialize;

/// Structured trace events emitted across all stepwise crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        session_id: String,
        process_name: String,
        state: String,
        missing_artifacts: usize,
    },
    SessionTransition {
        session_id: String,
        operation: String,
        state: String,
    },
    SessionPersisted {
        session_id: String,
        path: String,
    },
    HandoffWritten {
        session_id: String,
        handoff_type: String,
        path: String,
    },
    PluginInstalled {
        plugin_id: String,
        plugin_type: String,
        version: String,
        replaced: bool,
    },
    PluginInvoked {
        plugin_id: String,
        plugin_type: String,
        function: String,
        duration_ms: u64,
    },
    VcsCommit {
        repo_root: String,
        path: String,
        committed: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sw_event");
    }
}
