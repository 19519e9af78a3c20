pub mod config;
pub mod exit;
pub mod plugin;
pub mod process;
pub mod session;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use sw_domain::config::{Config, Paths};
use sw_plugins::{PluginInvoker, PluginRegistry};
use sw_sessions::{Runtime, SessionStore};

/// stepwise: artifact-gated process sessions with human checkpoints.
#[derive(Debug, Parser)]
#[command(name = "stepwise", version, about)]
pub struct Cli {
    /// Workspace root (defaults to the current directory).
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
    /// Commit every session write to the enclosing git repository.
    #[arg(long, global = true)]
    pub auto_commit: bool,
    /// Log at debug level unless STEPWISE_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scaffold a process layout in a target directory.
    Init {
        /// Process name written into PROCESS.yml.
        #[arg(short, long)]
        process: String,
        /// Directory to scaffold into.
        target: PathBuf,
    },
    /// Check a PROCESS.yml file.
    Validate {
        process_path: PathBuf,
        /// Also check that referenced artifacts exist.
        #[arg(long)]
        recursive: bool,
    },
    /// Start a session.
    Start {
        /// Process name.
        #[arg(long, required_unless_present = "process_file")]
        process: Option<String>,
        /// Artifacts that must exist before the session runs.
        #[arg(long, num_args = 0..)]
        required: Vec<String>,
        /// Take the name and required artifacts from a PROCESS.yml.
        #[arg(long, conflicts_with = "required")]
        process_file: Option<PathBuf>,
    },
    /// Re-check artifacts of a session waiting for input.
    Resume { session_id: String },
    /// Roll a session back to a recorded step.
    Reset { session_id: String, step_id: String },
    /// Register a decision at a human checkpoint.
    Decide { session_id: String, decision: String },
    /// Record an executed step.
    Step { session_id: String, step_id: String },
    /// Stop at a human checkpoint until a decision is registered.
    Checkpoint { session_id: String },
    /// Print a session as JSON.
    Status { session_id: String },
    /// Pause a session and write a handoff.
    Pause { session_id: String },
    /// Complete a session and write the final handoff.
    Complete { session_id: String },
    /// Manage and run plugins.
    #[command(subcommand)]
    Plugin(PluginCommand),
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum PluginCommand {
    /// Install a plugin bundle directory.
    Add { bundle_path: PathBuf },
    /// List installed plugins as JSON.
    List,
    /// Remove an installed plugin.
    Remove { plugin_id: String },
    /// Run a send plugin with a JSON payload.
    Send { plugin_id: String, payload_json: String },
    /// Run an export plugin on an input file.
    Export {
        plugin_id: String,
        input_path: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a hook plugin with a JSON context.
    Hook { plugin_id: String, context_json: String },
    /// Run a generate plugin with a JSON payload.
    Generate { plugin_id: String, payload_json: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any issues.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

const CONFIG_FILE: &str = "stepwise.toml";

/// Load the configuration from `STEPWISE_CONFIG`, or `stepwise.toml` in the
/// workspace. Returns the parsed [`Config`] and the path that was used.
pub fn load_config(workspace: &Path) -> anyhow::Result<(Config, PathBuf)> {
    let config_path = std::env::var_os("STEPWISE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| workspace.join(CONFIG_FILE));
    let config = read_config(&config_path)?;
    Ok((config, config_path))
}

/// Parse `path` if it exists, else return defaults.
pub fn read_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&raw)
        .map_err(|e| sw_domain::Error::Config(format!("parsing {}: {e}", path.display())))?;
    Ok(config)
}

/// Resolve the workspace root from `--workspace` or the current directory.
pub fn workspace_root(arg: Option<&Path>) -> anyhow::Result<PathBuf> {
    let path = match arg {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Ok(std::fs::canonicalize(&path).unwrap_or(path))
}

// ── Resolved context ─────────────────────────────────────────────────

/// Everything a command needs: the config and the directories it resolves
/// to for one workspace.
pub struct Context {
    pub config: Config,
    /// Where the config was read from (it may not exist).
    pub config_path: PathBuf,
    pub paths: Paths,
}

impl Context {
    pub fn new(workspace: &Path, mut config: Config, auto_commit: bool) -> Self {
        config.sessions.auto_commit |= auto_commit;
        let paths = Paths::resolve(workspace, &config);
        Self {
            config,
            config_path: workspace.join(CONFIG_FILE),
            paths,
        }
    }

    /// Resolve the workspace and load its configuration.
    pub fn open(workspace: Option<&Path>, auto_commit: bool) -> anyhow::Result<Self> {
        let workspace = workspace_root(workspace)?;
        let (config, config_path) = load_config(&workspace)?;
        let ctx = Self {
            config_path,
            ..Self::new(&workspace, config, auto_commit)
        };
        tracing::debug!(
            workspace = %ctx.paths.workspace.display(),
            config = %ctx.config_path.display(),
            "context resolved"
        );
        Ok(ctx)
    }

    pub fn runtime(&self) -> sw_domain::Result<Runtime> {
        let store = SessionStore::new(&self.paths.sessions, self.config.sessions.auto_commit)?;
        Ok(Runtime::new(store, &self.paths.handoffs))
    }

    pub fn registry(&self) -> sw_domain::Result<PluginRegistry> {
        PluginRegistry::new(&self.paths.plugins)
    }

    pub fn invoker(&self) -> sw_domain::Result<PluginInvoker> {
        PluginInvoker::with_process_loader(
            &self.paths.plugins,
            self.config.plugins.interpreter.clone(),
        )
    }
}
