use std::path::{Path, PathBuf};

use sw_domain::error::{Error, Result};
use sw_domain::trace::TraceEvent;

use crate::installer::{self, InstallResult};
use crate::loader;
use crate::manifest::{is_safe_dir_name, PluginManifest, PluginSummary};

/// On-disk registry of installed plugin bundles.
///
/// Nothing is cached: every query reads the plugins root, so edits made to
/// an installed bundle are seen by the next call.
pub struct PluginRegistry {
    plugins_root: PathBuf,
}

impl PluginRegistry {
    pub fn new(plugins_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(plugins_root)?;
        Ok(Self {
            plugins_root: plugins_root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.plugins_root
    }

    pub fn plugin_dir(&self, id: &str) -> PathBuf {
        self.plugins_root.join(id)
    }

    /// Validate the bundle at `bundle_dir` and install it under its id,
    /// replacing any earlier installation.
    pub fn add_from_path(&self, bundle_dir: &Path) -> Result<(PluginManifest, InstallResult)> {
        loader::check_bundle(bundle_dir)?;
        let manifest = loader::load_manifest(bundle_dir)?;
        let result = installer::install_from_dir(&self.plugins_root, &manifest, bundle_dir)?;

        TraceEvent::PluginInstalled {
            plugin_id: manifest.id.clone(),
            plugin_type: manifest.plugin_type.to_string(),
            version: manifest.version.clone(),
            replaced: result.replaced,
        }
        .emit();

        Ok((manifest, result))
    }

    /// Summaries of every installed bundle, sorted by id.
    pub fn list_plugins(&self) -> Result<Vec<PluginSummary>> {
        loader::scan_plugins(&self.plugins_root)
    }

    /// Re-read and re-validate an installed bundle's manifest.
    ///
    /// Only a directory directly under the root whose manifest carries the
    /// same id counts as installed.
    pub fn load_installed(&self, id: &str) -> Result<(PluginManifest, PathBuf)> {
        let not_found = || Error::PluginNotFound(id.to_string());
        if !is_safe_dir_name(id) {
            return Err(not_found());
        }
        let dir = self.plugin_dir(id);
        if !dir.is_dir() || loader::check_bundle(&dir).is_err() {
            return Err(not_found());
        }
        let manifest = loader::load_manifest(&dir)?;
        if manifest.id != id {
            tracing::warn!(
                plugin_dir = %dir.display(),
                manifest_id = %manifest.id,
                "installed manifest id does not match its directory"
            );
            return Err(not_found());
        }
        Ok((manifest, loader::code_path(&dir)))
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        if !is_safe_dir_name(id) {
            return Ok(false);
        }
        let removed = installer::uninstall(&self.plugins_root, id)?;
        if removed {
            tracing::info!(plugin_id = %id, "plugin removed");
        }
        Ok(removed)
    }
}
