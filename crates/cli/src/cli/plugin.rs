//! Plugin commands. Invocation commands print the plugin's result as
//! compact JSON.

use std::path::Path;

use anyhow::Context as _;
use serde_json::Value;

use super::Context;

pub fn add(ctx: &Context, bundle_path: &Path) -> anyhow::Result<String> {
    let bundle = std::fs::canonicalize(bundle_path).unwrap_or_else(|_| bundle_path.to_path_buf());
    let (manifest, result) = ctx.registry()?.add_from_path(&bundle)?;
    let verb = if result.replaced { "reinstalled" } else { "installed" };
    let note = if result.replaced && !result.changed {
        ", contents unchanged"
    } else {
        ""
    };
    Ok(format!(
        "plugin {verb}: {} {} ({}{note})",
        manifest.id, manifest.version, manifest.plugin_type
    ))
}

pub fn list(ctx: &Context) -> anyhow::Result<String> {
    let plugins = ctx.registry()?.list_plugins()?;
    Ok(serde_json::to_string_pretty(&plugins)?)
}

pub fn remove(ctx: &Context, plugin_id: &str) -> anyhow::Result<String> {
    if ctx.registry()?.remove(plugin_id)? {
        Ok(format!("plugin removed: {plugin_id}"))
    } else {
        Err(sw_domain::Error::PluginNotFound(plugin_id.to_string()).into())
    }
}

pub fn send(ctx: &Context, plugin_id: &str, payload_json: &str) -> anyhow::Result<String> {
    let payload = parse_json(payload_json, "payload")?;
    render(ctx.invoker()?.execute_send(plugin_id, payload)?)
}

pub fn export(
    ctx: &Context,
    plugin_id: &str,
    input_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<String> {
    let input = absolute(input_path);
    let output = output.map(absolute);
    render(
        ctx.invoker()?
            .execute_export(plugin_id, &input, output.as_deref())?,
    )
}

pub fn hook(ctx: &Context, plugin_id: &str, context_json: &str) -> anyhow::Result<String> {
    let context = parse_json(context_json, "context")?;
    render(ctx.invoker()?.execute_hook(plugin_id, context)?)
}

pub fn generate(ctx: &Context, plugin_id: &str, payload_json: &str) -> anyhow::Result<String> {
    let payload = parse_json(payload_json, "payload")?;
    render(ctx.invoker()?.execute_generate(plugin_id, payload)?)
}

fn parse_json(raw: &str, what: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("{what} is not valid JSON"))
}

fn render(value: Value) -> anyhow::Result<String> {
    Ok(serde_json::to_string(&value)?)
}

/// Plugins run from their own directory, so relative paths are anchored to
/// the caller's current directory first.
fn absolute(path: &Path) -> std::path::PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
