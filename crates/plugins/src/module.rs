//! Plugin code units.
//!
//! A bundle's code unit is loaded through a [`ModuleLoader`] into a
//! [`PluginModule`], which reports the functions it exports and runs one of
//! them with an [`Invocation`]. The default [`ProcessLoader`] treats the
//! code unit as an executable speaking newline-delimited JSON:
//!
//! - `plugin --exports` prints a JSON array of function names.
//! - `plugin call <function>` reads one JSON request line on stdin and
//!   prints the JSON result on stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use serde_json::Value;

use sw_domain::error::{Error, Result};

use crate::manifest::PluginType;

/// Capability-specific arguments handed to a plugin function.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Invocation {
    Send {
        payload: Value,
    },
    Export {
        input_path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        output_path: Option<PathBuf>,
    },
    Hook {
        context: Value,
    },
    Generate {
        payload: Value,
    },
}

impl Invocation {
    /// The plugin type this invocation is valid for.
    pub fn plugin_type(&self) -> PluginType {
        match self {
            Invocation::Send { .. } => PluginType::Send,
            Invocation::Export { .. } => PluginType::Export,
            Invocation::Hook { .. } => PluginType::Hook,
            Invocation::Generate { .. } => PluginType::Generate,
        }
    }
}

/// A loaded code unit.
///
/// Implementors provide [`exports`](Self::exports) and
/// [`call`](Self::call); the per-capability methods are the signatures each
/// plugin type is invoked through.
pub trait PluginModule {
    /// Names of the functions the code unit can run.
    fn exports(&self) -> Result<Vec<String>>;

    /// Run `function`, returning its result untouched.
    fn call(&self, function: &str, invocation: &Invocation) -> Result<Value>;

    /// `send` plugins: deliver a payload.
    fn send(&self, function: &str, payload: Value) -> Result<Value> {
        self.call(function, &Invocation::Send { payload })
    }

    /// `export` plugins: render `input_path`, optionally into `output_path`.
    fn export(
        &self,
        function: &str,
        input_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<Value> {
        self.call(
            function,
            &Invocation::Export {
                input_path: input_path.to_path_buf(),
                output_path: output_path.map(Path::to_path_buf),
            },
        )
    }

    /// `hook` plugins: react to a context.
    fn hook(&self, function: &str, context: Value) -> Result<Value> {
        self.call(function, &Invocation::Hook { context })
    }

    /// `generate` plugins: produce content from a payload.
    fn generate(&self, function: &str, payload: Value) -> Result<Value> {
        self.call(function, &Invocation::Generate { payload })
    }
}

/// Turns a code unit on disk into a [`PluginModule`].
pub trait ModuleLoader: Send + Sync {
    fn load(&self, plugin_id: &str, code: &Path) -> Result<Box<dyn PluginModule>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Child-process modules
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Runs code units as child processes, optionally through an interpreter
/// (`sh`, `python3`, ...).
#[derive(Debug, Clone, Default)]
pub struct ProcessLoader {
    interpreter: Option<String>,
}

impl ProcessLoader {
    /// A blank interpreter counts as none.
    pub fn new(interpreter: Option<String>) -> Self {
        Self {
            interpreter: interpreter.filter(|i| !i.trim().is_empty()),
        }
    }
}

impl ModuleLoader for ProcessLoader {
    fn load(&self, plugin_id: &str, code: &Path) -> Result<Box<dyn PluginModule>> {
        if !code.is_file() {
            return Err(Error::PluginNotFound(plugin_id.to_string()));
        }
        // Children run from the bundle directory, so the path must not be
        // relative to ours.
        let code = std::fs::canonicalize(code)?;
        Ok(Box::new(ProcessModule {
            plugin_id: plugin_id.to_string(),
            code,
            interpreter: self.interpreter.clone(),
        }))
    }
}

/// One request line written to the child's stdin.
#[derive(Serialize)]
struct CallRequest<'a> {
    function: &'a str,
    #[serde(flatten)]
    invocation: &'a Invocation,
}

pub struct ProcessModule {
    plugin_id: String,
    code: PathBuf,
    interpreter: Option<String>,
}

impl ProcessModule {
    fn command(&self) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut c = Command::new(interpreter);
                c.arg(&self.code);
                c
            }
            None => Command::new(&self.code),
        };
        if let Some(dir) = self.code.parent() {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn failure(&self, status: std::process::ExitStatus, stderr: &[u8]) -> Error {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        Error::PluginExecution {
            plugin_id: self.plugin_id.clone(),
            message: if stderr.is_empty() {
                format!("exited with {status}")
            } else {
                stderr
            },
        }
    }
}

impl PluginModule for ProcessModule {
    fn exports(&self) -> Result<Vec<String>> {
        let output = self
            .command()
            .arg("--exports")
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(self.failure(output.status, &output.stderr));
        }
        serde_json::from_slice(&output.stdout).map_err(|e| {
            Error::Entrypoint(format!(
                "plugin '{}' reported malformed exports: {e}",
                self.plugin_id
            ))
        })
    }

    fn call(&self, function: &str, invocation: &Invocation) -> Result<Value> {
        let mut request = serde_json::to_vec(&CallRequest {
            function,
            invocation,
        })?;
        request.push(b'\n');

        let mut child = self
            .command()
            .arg("call")
            .arg(function)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A plugin that never reads its request closes the pipe early.
            match stdin.write_all(&request) {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(self.failure(output.status, &output.stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(stdout).map_err(|e| Error::PluginExecution {
            plugin_id: self.plugin_id.clone(),
            message: format!("output is not JSON: {e}"),
        })
    }
}
