use std::path::{Path, PathBuf};

use sw_domain::error::{Error, Result};

use crate::manifest::{PluginManifest, PluginSummary, CODE_FILE, MANIFEST_FILE};

/// Check that `dir` holds both bundle members.
pub fn check_bundle(dir: &Path) -> Result<()> {
    if dir.join(MANIFEST_FILE).is_file() && dir.join(CODE_FILE).is_file() {
        Ok(())
    } else {
        Err(Error::IncompleteBundle(dir.to_path_buf()))
    }
}

/// Load and validate `plugin.yml` from a bundle directory.
pub fn load_manifest(dir: &Path) -> Result<PluginManifest> {
    let content = std::fs::read_to_string(dir.join(MANIFEST_FILE))?;
    PluginManifest::parse(&content)
}

/// Path of the code unit inside a bundle directory.
pub fn code_path(dir: &Path) -> PathBuf {
    dir.join(CODE_FILE)
}

/// Scan the plugins root and summarise every directory with a manifest.
pub fn scan_plugins(plugins_root: &Path) -> Result<Vec<PluginSummary>> {
    let mut entries = Vec::new();
    if !plugins_root.exists() {
        return Ok(entries);
    }
    for entry in std::fs::read_dir(plugins_root)? {
        let entry = entry?;
        let path = entry.path();
        let manifest_path = path.join(MANIFEST_FILE);
        if !path.is_dir() || !manifest_path.is_file() {
            continue;
        }
        let dir_name = entry.file_name().to_string_lossy().to_string();
        let summary = std::fs::read_to_string(&manifest_path)
            .map_err(Error::from)
            .and_then(|content| PluginSummary::parse(&content, &dir_name));
        match summary {
            Ok(summary) => entries.push(summary),
            Err(e) => {
                tracing::warn!(
                    plugin_dir = %path.display(),
                    error = %e,
                    "skipping plugin directory with unreadable plugin.yml"
                );
            }
        }
    }
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entries)
}
