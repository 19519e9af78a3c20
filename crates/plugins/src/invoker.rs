use std::path::Path;
use std::time::Instant;

use serde_json::Value;

use sw_domain::error::{Error, Result};
use sw_domain::trace::TraceEvent;

use crate::manifest::{PluginType, ENTRYPOINT_MODULE};
use crate::module::{ModuleLoader, PluginModule, ProcessLoader};
use crate::registry::PluginRegistry;

/// Runs one declared capability of an installed plugin.
///
/// Every call re-reads and re-validates the installed manifest, so a bundle
/// edited after install is held to the same rules. The plugin's return
/// value is passed back without interpretation.
pub struct PluginInvoker {
    registry: PluginRegistry,
    loader: Box<dyn ModuleLoader>,
}

impl PluginInvoker {
    pub fn new(plugins_root: &Path, loader: Box<dyn ModuleLoader>) -> Result<Self> {
        Ok(Self {
            registry: PluginRegistry::new(plugins_root)?,
            loader,
        })
    }

    /// Invoker backed by child-process modules.
    pub fn with_process_loader(plugins_root: &Path, interpreter: Option<String>) -> Result<Self> {
        Self::new(plugins_root, Box::new(ProcessLoader::new(interpreter)))
    }

    pub fn execute_send(&self, plugin_id: &str, payload: Value) -> Result<Value> {
        self.invoke(plugin_id, PluginType::Send, |module, function| {
            module.send(function, payload)
        })
    }

    pub fn execute_export(
        &self,
        plugin_id: &str,
        input_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<Value> {
        self.invoke(plugin_id, PluginType::Export, |module, function| {
            module.export(function, input_path, output_path)
        })
    }

    pub fn execute_hook(&self, plugin_id: &str, context: Value) -> Result<Value> {
        self.invoke(plugin_id, PluginType::Hook, |module, function| {
            module.hook(function, context)
        })
    }

    pub fn execute_generate(&self, plugin_id: &str, payload: Value) -> Result<Value> {
        self.invoke(plugin_id, PluginType::Generate, |module, function| {
            module.generate(function, payload)
        })
    }

    fn invoke(
        &self,
        plugin_id: &str,
        expected: PluginType,
        run: impl FnOnce(&dyn PluginModule, &str) -> Result<Value>,
    ) -> Result<Value> {
        let (manifest, code) = self.registry.load_installed(plugin_id)?;

        if manifest.plugin_type != expected {
            return Err(Error::TypeMismatch {
                plugin_id: plugin_id.to_string(),
                expected: expected.to_string(),
                actual: manifest.plugin_type.to_string(),
            });
        }

        let entry = manifest.entrypoint();
        if entry.module != ENTRYPOINT_MODULE {
            return Err(Error::Entrypoint(format!(
                "entrypoint '{entry}' of plugin '{plugin_id}' must use module '{ENTRYPOINT_MODULE}'"
            )));
        }

        let module = self.loader.load(plugin_id, &code)?;
        if !module.exports()?.iter().any(|f| *f == entry.function) {
            return Err(Error::Entrypoint(format!(
                "function '{}' not found in plugin '{plugin_id}'",
                entry.function
            )));
        }

        tracing::debug!(plugin_id = %plugin_id, function = %entry.function, "invoking plugin");
        let started = Instant::now();
        let result = run(module.as_ref(), &entry.function)?;

        TraceEvent::PluginInvoked {
            plugin_id: plugin_id.to_string(),
            plugin_type: expected.to_string(),
            function: entry.function,
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(result)
    }
}
