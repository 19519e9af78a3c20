//! Process definitions and `PROCESS.yml` files.
//!
//! A process file lists phases, each naming the artifacts it expects:
//! ```yaml
//! name: onboarding
//! phases:
//!   - id: discovery
//!     artifacts:
//!       - artifacts/briefing.md
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Relative location of the process file inside a process directory.
pub const PROCESS_FILE: &str = "process/PROCESS.yml";

/// What a caller hands the runtime when starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    pub name: String,
    #[serde(default)]
    pub required_artifacts: Vec<String>,
}

impl ProcessDefinition {
    pub fn new(name: impl Into<String>, required_artifacts: Vec<String>) -> Self {
        Self {
            name: name.into(),
            required_artifacts,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROCESS.yml
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl ProcessFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str::<Option<ProcessFile>>(&raw)?.unwrap_or_default())
    }

    /// Build a definition from the phases' artifacts, first occurrence wins.
    /// Falls back to `fallback_name` when the file does not name itself.
    pub fn to_definition(&self, fallback_name: &str) -> ProcessDefinition {
        let mut required: Vec<String> = Vec::new();
        for artifact in self.phases.iter().flat_map(|p| p.artifacts.iter()) {
            if !required.contains(artifact) {
                required.push(artifact.clone());
            }
        }
        let name = self
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        ProcessDefinition::new(name, required)
    }
}

/// Outcome of checking a process file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub phases: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn fail(msg: impl Into<String>) -> Self {
        Self {
            errors: vec![msg.into()],
            phases: 0,
        }
    }
}

/// Check that `path` is a usable process file.
///
/// With `recursive`, every referenced artifact must exist relative to the
/// parent of the directory holding the process file.
pub fn validate_process_file(path: &Path, recursive: bool) -> ValidationReport {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return ValidationReport::fail(format!("{} not found", path.display())),
    };
    if content.trim().is_empty() {
        return ValidationReport::fail("process file is empty");
    }
    let file: ProcessFile = match serde_yaml::from_str::<Option<ProcessFile>>(&content) {
        Ok(f) => f.unwrap_or_default(),
        Err(e) => return ValidationReport::fail(format!("invalid YAML: {e}")),
    };
    if file.phases.is_empty() {
        return ValidationReport::fail("phases missing or empty");
    }

    let mut report = ValidationReport {
        errors: Vec::new(),
        phases: file.phases.len(),
    };

    if recursive {
        let base = path
            .parent()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        let missing: Vec<&str> = file
            .phases
            .iter()
            .flat_map(|p| p.artifacts.iter())
            .filter(|a| !base.join(a).exists())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            report
                .errors
                .push(format!("missing artifacts: {}", missing.join(", ")));
        }
    }

    report
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scaffolding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const PLACEHOLDER_ARTIFACT: &str = "artifacts/briefing.md";

/// Create a minimal process layout under `target`. Existing files are left
/// alone. Returns the files that were written.
pub fn scaffold(process_name: &str, target: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let process_path = target.join(PROCESS_FILE);
    if !process_path.exists() {
        if let Some(parent) = process_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = ProcessFile {
            name: Some(process_name.to_string()),
            phases: vec![Phase {
                id: "discovery".into(),
                artifacts: vec![PLACEHOLDER_ARTIFACT.into()],
            }],
        };
        std::fs::write(&process_path, serde_yaml::to_string(&file)?)?;
        written.push(process_path);
    }

    let placeholder = target.join(PLACEHOLDER_ARTIFACT);
    if !placeholder.exists() {
        if let Some(parent) = placeholder.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&placeholder, "# Initial briefing\n")?;
        written.push(placeholder);
    }

    Ok(written)
}
