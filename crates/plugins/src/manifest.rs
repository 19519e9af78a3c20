//! Plugin manifest, parsed from `plugin.yml` at the bundle root.
//!
//! ```yaml
//! id: slack-notify
//! name: Slack notifier
//! version: 1.0.0
//! type: send
//! entrypoint: plugin:run
//! permissions:
//!   network: false
//!   fs: [./out]
//!   env: [SLACK_CHANNEL]
//! ```
//!
//! Validation runs in a fixed order and stops at the first failing rule, so
//! a given manifest is always rejected for the same reason:
//! 1. `id`, `name`, `version`, `type`, `entrypoint` present and non-empty
//! 2. `type` is one of send/export/hook/generate
//! 3. `entrypoint` has the `module:function` shape
//! 4. `permissions` present and a mapping
//! 5. `permissions.network` falsy (network plugins are always refused)
//! 6. `permissions.fs` / `permissions.env`, when present, are lists
//! 7. `id` is usable as a directory name

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use sw_domain::error::{Error, ManifestError, Result};

pub const MANIFEST_FILE: &str = "plugin.yml";
pub const CODE_FILE: &str = "plugin";
/// The only module qualifier an entrypoint may name.
pub const ENTRYPOINT_MODULE: &str = "plugin";

const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "version", "type", "entrypoint"];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Plugin type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Send,
    Export,
    Hook,
    Generate,
}

impl PluginType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "send" => Some(PluginType::Send),
            "export" => Some(PluginType::Export),
            "hook" => Some(PluginType::Hook),
            "generate" => Some(PluginType::Generate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Send => "send",
            PluginType::Export => "export",
            PluginType::Hook => "hook",
            PluginType::Generate => "generate",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Permissions & entrypoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Declared permissions. Only `network` is enforced; `fs` and `env` are
/// informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub network: bool,
    #[serde(default)]
    pub fs: Vec<String>,
    #[serde(default)]
    pub env: Vec<String>,
}

impl Permissions {
    /// Best-effort read of a permissions block, ignoring wrongly-typed
    /// fields. Used for listing, never for gating.
    fn lenient(value: Option<&Value>) -> Self {
        let Some(map) = value.and_then(Value::as_mapping) else {
            return Self::default();
        };
        Self {
            network: map.get("network").is_some_and(is_truthy),
            fs: string_list(map.get("fs")).unwrap_or_default(),
            env: string_list(map.get("env")).unwrap_or_default(),
        }
    }
}

/// `module:function`, split at the first colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrypoint {
    pub module: String,
    pub function: String,
}

impl Entrypoint {
    pub fn parse(s: &str) -> Option<Self> {
        let (module, function) = s.split_once(':')?;
        Some(Self {
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

impl fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PluginManifest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A manifest that passed every validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginManifest {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub plugin_type: PluginType,
    pub entrypoint: String,
    pub permissions: Permissions,
}

impl PluginManifest {
    /// Parse and validate manifest YAML.
    pub fn parse(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed document. A document that is not a
    /// mapping is treated as an empty one.
    pub fn from_value(value: &Value) -> Result<Self> {
        let empty = Mapping::new();
        let map = value.as_mapping().unwrap_or(&empty);

        // 1. required fields
        let mut fields: Vec<String> = Vec::with_capacity(REQUIRED_FIELDS.len());
        for key in REQUIRED_FIELDS {
            match scalar_string(map.get(key)) {
                Some(v) => fields.push(v),
                None => return Err(ManifestError::MissingField(key).into()),
            }
        }
        let [id, name, version, type_str, entrypoint]: [String; 5] = fields
            .try_into()
            .map_err(|_| ManifestError::MissingField("id"))?;

        // 2. type
        let plugin_type =
            PluginType::parse(&type_str).ok_or_else(|| ManifestError::InvalidType(type_str.clone()))?;

        // 3. entrypoint shape
        if !entrypoint.contains(':') {
            return Err(ManifestError::EntrypointFormat(entrypoint).into());
        }

        // 4. permissions block
        let perms = match map.get("permissions") {
            None | Some(Value::Null) => return Err(ManifestError::PermissionsMissing.into()),
            Some(v) => v.as_mapping().ok_or(ManifestError::PermissionsMalformed)?,
        };

        // 5. offline-only
        if perms.get("network").is_some_and(is_truthy) {
            return Err(Error::PermissionDenied(format!(
                "plugin '{id}' requests network access; plugins run offline-only"
            )));
        }

        // 6. fs / env shapes
        let fs = match perms.get("fs") {
            None => Vec::new(),
            v => string_list(v).ok_or(ManifestError::NotAList("fs"))?,
        };
        let env = match perms.get("env") {
            None => Vec::new(),
            v => string_list(v).ok_or(ManifestError::NotAList("env"))?,
        };

        // 7. id doubles as the install directory name
        if !is_safe_dir_name(&id) {
            return Err(ManifestError::UnsafeId(id).into());
        }

        Ok(Self {
            id,
            name,
            version,
            plugin_type,
            entrypoint,
            permissions: Permissions {
                network: false,
                fs,
                env,
            },
        })
    }

    /// The parsed entrypoint. Always present on a validated manifest.
    pub fn entrypoint(&self) -> Entrypoint {
        Entrypoint::parse(&self.entrypoint).unwrap_or(Entrypoint {
            module: self.entrypoint.clone(),
            function: String::new(),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Listing view
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What `plugin list` reports for one installed bundle. Read leniently so a
/// bundle edited into an invalid state still shows up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub permissions: Permissions,
}

impl PluginSummary {
    pub fn parse(yaml: &str, fallback_id: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        let map = value.as_mapping();
        let field = |key: &str| scalar_string(map.and_then(|m| m.get(key)));
        Ok(Self {
            id: field("id").unwrap_or_else(|| fallback_id.to_string()),
            plugin_type: field("type").unwrap_or_default(),
            permissions: Permissions::lenient(map.and_then(|m| m.get("permissions"))),
        })
    }
}

// ── YAML helpers ────────────────────────────────────────────────────

/// A present, non-empty scalar rendered as a string.
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        Value::Tagged(t) => scalar_string(Some(&t.value)),
        _ => None,
    }
}

/// The scalar items of a sequence, or `None` when the value is not one.
/// Non-scalar items are dropped.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::Sequence(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(s) => !s.is_empty(),
        Value::Mapping(m) => !m.is_empty(),
        Value::Tagged(t) => is_truthy(&t.value),
    }
}

/// Whether `id` names a single directory directly under the plugins root.
pub(crate) fn is_safe_dir_name(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\'])
        && !id.chars().any(char::is_control)
}
