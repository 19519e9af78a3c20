//! Plugin installer: manages installed bundles on disk.
//!
//! Installed bundles live under `{plugins_root}/{id}/` as verbatim copies of
//! the source bundle. Where each one came from is recorded outside the
//! bundle, in `{plugins_root}/.meta/{id}.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sw_domain::error::{Error, Result};

use crate::loader;
use crate::manifest::PluginManifest;

/// Bookkeeping directory under the plugins root. Its name can never be a
/// plugin id, and it holds no manifest, so listing never sees it.
pub const META_DIR: &str = ".meta";

/// Bookkeeping metadata written to `.meta/{id}.json` for each installed
/// bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMeta {
    /// Absolute path of the bundle directory the install was made from.
    pub source: String,
    pub installed_at: String,
    pub version: String,
    /// SHA-256 of file names + sizes of the installed bundle.
    pub files_hash: String,
}

/// Result of an install operation.
#[derive(Debug, Serialize)]
pub struct InstallResult {
    pub plugin_dir: PathBuf,
    pub origin: OriginMeta,
    /// An earlier installation with the same id was replaced.
    pub replaced: bool,
    /// The replaced installation had different contents.
    pub changed: bool,
}

/// Copy `source_dir` into `{plugins_root}/{manifest.id}/`, replacing any
/// previous installation, and record its origin.
///
/// The copy is staged under `.meta/` and renamed over the target only once
/// it holds a complete bundle, so installing from the target itself (or a
/// directory inside it) never wipes the installation.
pub fn install_from_dir(
    plugins_root: &Path,
    manifest: &PluginManifest,
    source_dir: &Path,
) -> Result<InstallResult> {
    std::fs::create_dir_all(plugins_root.join(META_DIR))?;
    let root = std::fs::canonicalize(plugins_root)?;
    let source = std::fs::canonicalize(source_dir)?;
    let target = root.join(&manifest.id);

    let prev_hash = read_origin(&root, &manifest.id).map(|o| o.files_hash);
    let replaced = target.exists();

    let staging = root.join(META_DIR).join(format!("{}.staging", manifest.id));
    if staging.exists() {
        std::fs::remove_dir_all(&staging)?;
    }
    std::fs::create_dir_all(&staging)?;
    // A source that contains the plugins root must not copy it into itself.
    if let Err(e) = copy_dir_recursive(&source, &staging, &root) {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(e.into());
    }
    if loader::check_bundle(&staging).is_err() {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(Error::IncompleteBundle(source));
    }

    if replaced {
        std::fs::remove_dir_all(&target)?;
    }
    std::fs::rename(&staging, &target)?;

    let files_hash = compute_dir_hash(&target);
    let changed = prev_hash.is_some_and(|h| h != files_hash);

    let origin = OriginMeta {
        source: source.display().to_string(),
        installed_at: chrono::Utc::now().to_rfc3339(),
        version: manifest.version.clone(),
        files_hash,
    };
    std::fs::write(
        origin_path(&root, &manifest.id),
        serde_json::to_string_pretty(&origin)?,
    )?;

    Ok(InstallResult {
        plugin_dir: plugins_root.join(&manifest.id),
        origin,
        replaced,
        changed,
    })
}

/// Remove an installed bundle and its bookkeeping. Returns whether anything
/// was removed.
pub fn uninstall(plugins_root: &Path, id: &str) -> Result<bool> {
    let target = plugins_root.join(id);
    let meta = origin_path(plugins_root, id);
    if meta.is_file() {
        std::fs::remove_file(&meta)?;
    }
    if !target.is_dir() {
        return Ok(false);
    }
    std::fs::remove_dir_all(&target)?;
    Ok(true)
}

/// Read the origin record of an installed bundle (None if absent or
/// unreadable).
pub fn read_origin(plugins_root: &Path, id: &str) -> Option<OriginMeta> {
    let content = std::fs::read_to_string(origin_path(plugins_root, id)).ok()?;
    serde_json::from_str(&content).ok()
}

fn origin_path(plugins_root: &Path, id: &str) -> PathBuf {
    plugins_root.join(META_DIR).join(format!("{id}.json"))
}

/// Compute a SHA-256 hash of all file names + sizes in a directory.
pub fn compute_dir_hash(dir: &Path) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();

    if let Ok(entries) = walkdir(dir) {
        for (rel_path, size) in entries {
            hasher.update(rel_path.as_bytes());
            hasher.update(size.to_le_bytes());
        }
    }

    format!("{:x}", hasher.finalize())
}

fn copy_dir_recursive(src: &Path, dst: &Path, skip: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path == skip {
            continue;
        }
        let dest_path = dst.join(entry.file_name());
        if entry_path.is_dir() {
            std::fs::create_dir_all(&dest_path)?;
            copy_dir_recursive(&entry_path, &dest_path, skip)?;
        } else {
            // fs::copy carries permission bits, so the code file stays
            // executable.
            std::fs::copy(&entry_path, &dest_path)?;
        }
    }
    Ok(())
}

fn walkdir(dir: &Path) -> std::io::Result<Vec<(String, u64)>> {
    let mut entries = Vec::new();
    walkdir_inner(dir, dir, &mut entries)?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn walkdir_inner(
    root: &Path,
    current: &Path,
    entries: &mut Vec<(String, u64)>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walkdir_inner(root, &path, entries)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            let size = entry.metadata()?.len();
            entries.push((rel, size));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn manifest(id: &str, version: &str) -> PluginManifest {
        PluginManifest::parse(&format!(
            "id: {id}\nname: Test\nversion: {version}\ntype: hook\nentrypoint: plugin:run\npermissions: {{}}\n"
        ))
        .unwrap()
    }

    fn bundle(dir: &Path, code: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("plugin.yml"), "id: t").unwrap();
        fs::write(dir.join("plugin"), code).unwrap();
    }

    #[test]
    fn install_and_uninstall_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("plugins");
        let source = tmp.path().join("source");
        bundle(&source, "echo hi");
        fs::create_dir_all(source.join("assets")).unwrap();
        fs::write(source.join("assets/logo.txt"), "logo").unwrap();

        let result = install_from_dir(&root, &manifest("t", "1.0"), &source).unwrap();
        assert!(!result.replaced);
        assert_eq!(result.plugin_dir, root.join("t"));
        assert!(result.plugin_dir.join("plugin").exists());
        assert!(result.plugin_dir.join("assets/logo.txt").exists());

        let origin = read_origin(&root, "t").unwrap();
        assert_eq!(origin, result.origin);
        assert_eq!(origin.version, "1.0");
        assert!(origin.source.ends_with("source"));

        assert!(uninstall(&root, "t").unwrap());
        assert!(!result.plugin_dir.exists());
        assert!(read_origin(&root, "t").is_none());
    }

    #[test]
    fn installed_bundle_is_a_verbatim_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("plugins");
        let source = tmp.path().join("source");
        bundle(&source, "x");
        fs::create_dir_all(source.join(".stepwise")).unwrap();
        fs::write(source.join(".stepwise/notes.txt"), "kept").unwrap();

        let result = install_from_dir(&root, &manifest("t", "1"), &source).unwrap();
        assert_eq!(
            fs::read_to_string(result.plugin_dir.join(".stepwise/notes.txt")).unwrap(),
            "kept"
        );
        assert_eq!(compute_dir_hash(&result.plugin_dir), compute_dir_hash(&source));
        assert_eq!(result.origin.files_hash, compute_dir_hash(&source));

        let mut names: Vec<String> = fs::read_dir(&result.plugin_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec![".stepwise", "plugin", "plugin.yml"]);
    }

    #[test]
    fn reinstall_overwrites_and_drops_stale_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("plugins");
        let v1 = tmp.path().join("v1");
        let v2 = tmp.path().join("v2");
        bundle(&v1, "v1");
        fs::write(v1.join("old.txt"), "stale").unwrap();
        bundle(&v2, "version two");

        install_from_dir(&root, &manifest("t", "1"), &v1).unwrap();
        let second = install_from_dir(&root, &manifest("t", "2"), &v2).unwrap();

        assert!(second.replaced);
        assert!(second.changed);
        assert_eq!(fs::read_to_string(root.join("t/plugin")).unwrap(), "version two");
        assert!(!root.join("t/old.txt").exists());
        assert_eq!(read_origin(&root, "t").unwrap().version, "2");
    }

    #[test]
    fn reinstall_of_same_contents_is_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("plugins");
        let source = tmp.path().join("source");
        bundle(&source, "same");

        install_from_dir(&root, &manifest("t", "1"), &source).unwrap();
        let again = install_from_dir(&root, &manifest("t", "1"), &source).unwrap();
        assert!(again.replaced);
        assert!(!again.changed);
    }

    #[test]
    fn installing_from_the_installed_dir_keeps_it() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("plugins");
        let source = tmp.path().join("source");
        bundle(&source, "keep me");
        install_from_dir(&root, &manifest("t", "1"), &source).unwrap();

        let again = install_from_dir(&root, &manifest("t", "1"), &root.join("t")).unwrap();
        assert!(again.replaced);
        assert!(!again.changed);
        assert_eq!(fs::read_to_string(root.join("t/plugin")).unwrap(), "keep me");
        assert!(root.join("t/plugin.yml").exists());
        assert!(!root.join(META_DIR).join("t.staging").exists());
    }

    #[test]
    fn installing_from_inside_the_installed_dir_uses_its_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("plugins");
        let source = tmp.path().join("source");
        bundle(&source, "outer");
        bundle(&source.join("nested"), "inner");
        install_from_dir(&root, &manifest("t", "1"), &source).unwrap();

        install_from_dir(&root, &manifest("t", "2"), &root.join("t/nested")).unwrap();
        assert_eq!(fs::read_to_string(root.join("t/plugin")).unwrap(), "inner");
        assert!(!root.join("t/nested").exists());
    }

    #[test]
    fn source_containing_the_root_is_not_copied_into_itself() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source");
        bundle(&source, "x");
        let root = source.join("plugins");

        let result = install_from_dir(&root, &manifest("t", "1"), &source).unwrap();
        assert!(result.plugin_dir.join("plugin").exists());
        assert!(!result.plugin_dir.join("plugins").exists());
    }

    #[test]
    fn failed_install_keeps_previous_installation() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("plugins");
        let source = tmp.path().join("source");
        bundle(&source, "v1");
        install_from_dir(&root, &manifest("t", "1"), &source).unwrap();

        let empty = tmp.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        assert!(matches!(
            install_from_dir(&root, &manifest("t", "2"), &empty),
            Err(Error::IncompleteBundle(_))
        ));
        assert_eq!(fs::read_to_string(root.join("t/plugin")).unwrap(), "v1");
        assert_eq!(read_origin(&root, "t").unwrap().version, "1");
        assert!(!root.join(META_DIR).join("t.staging").exists());
    }

    #[test]
    fn uninstall_nonexistent() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!uninstall(tmp.path(), "missing").unwrap());
    }
}
