use std::path::PathBuf;

/// Shared error type used across all stepwise crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("plugin not installed: {0}")]
    PluginNotFound(String),

    #[error("plugin manifest or code missing in {}", .0.display())]
    IncompleteBundle(PathBuf),

    #[error("invalid manifest: {0}")]
    InvalidManifest(#[from] ManifestError),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("plugin '{plugin_id}' is of type '{actual}', expected '{expected}'")]
    TypeMismatch {
        plugin_id: String,
        expected: String,
        actual: String,
    },

    #[error("step '{0}' not found in session history")]
    StepNotFound(String),

    #[error("no pending decision (session is {state})")]
    NoPendingDecision { state: String },

    #[error("entrypoint: {0}")]
    Entrypoint(String),

    #[error("plugin '{plugin_id}' failed: {message}")]
    PluginExecution { plugin_id: String, message: String },

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Stable tag for the condition, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Yaml(_) => "yaml",
            Error::Json(_) => "json",
            Error::SessionNotFound(_) | Error::PluginNotFound(_) => "not_found",
            Error::IncompleteBundle(_) => "incomplete_bundle",
            Error::InvalidManifest(_) => "invalid_manifest",
            Error::PermissionDenied(_) => "permission_denied",
            Error::TypeMismatch { .. } => "type_mismatch",
            Error::StepNotFound(_) => "step_not_found",
            Error::NoPendingDecision { .. } => "no_pending_decision",
            Error::Entrypoint(_) => "entrypoint",
            Error::PluginExecution { .. } => "plugin_execution",
            Error::Config(_) => "config",
        }
    }
}

/// Reasons a plugin manifest is rejected, one per validation rule.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("required field {0} missing")]
    MissingField(&'static str),

    #[error("invalid plugin type '{0}' (expected send|export|hook|generate)")]
    InvalidType(String),

    #[error("entrypoint '{0}' must be module:function")]
    EntrypointFormat(String),

    #[error("permissions missing")]
    PermissionsMissing,

    #[error("permissions malformed: expected a mapping")]
    PermissionsMalformed,

    #[error("permissions.{0} must be a list")]
    NotAList(&'static str),

    #[error("plugin id '{0}' is not a valid directory name")]
    UnsafeId(String),
}

pub type Result<T> = std::result::Result<T, Error>;
