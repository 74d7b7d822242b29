//! `clean`: empties the output directory before each run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use super::{HookContext, Plugin, PluginError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanOptions {
    /// Only log what would be removed
    pub dry: bool,

    /// Top-level file or directory names left in place
    pub keep: Vec<String>,
}

#[derive(Debug)]
pub struct CleanPlugin {
    options: CleanOptions,
}

impl CleanPlugin {
    pub fn new(options: CleanOptions) -> Self {
        Self { options }
    }

    fn is_kept(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.options.keep.iter().any(|k| name == k.as_str()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Plugin for CleanPlugin {
    fn name(&self) -> &str {
        "clean"
    }

    async fn before_run(&self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
        let cwd = std::env::current_dir()?;
        let out_dir = ensure_inside_root(ctx.config().output_dir(), ctx.config().root(), &cwd)?;

        if !fs::try_exists(&out_dir).await? {
            debug!(dir = %out_dir.display(), "creating output directory");
            fs::create_dir_all(&out_dir).await?;
            return Ok(());
        }

        let metadata = fs::metadata(&out_dir).await?;
        if !metadata.is_dir() {
            return Err(PluginError::Failed(format!(
                "output path exists but is not a directory: {}",
                out_dir.display()
            )));
        }

        let mut removed = 0usize;
        let mut entries = fs::read_dir(&out_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if self.is_kept(&path) {
                continue;
            }

            if self.options.dry {
                info!(path = %path.display(), "would remove");
                continue;
            }

            if entry.file_type().await?.is_dir() {
                fs::remove_dir_all(&path).await?;
            } else {
                fs::remove_file(&path).await?;
            }
            removed += 1;
        }

        debug!(dir = %out_dir.display(), removed, dry = self.options.dry, "cleaned output directory");
        Ok(())
    }
}

/// Absolute, cleaned output directory, provided it lies strictly below the
/// project root. Relative paths are taken against `cwd`.
fn ensure_inside_root(out_dir: &Path, root: &Path, cwd: &Path) -> Result<PathBuf, PluginError> {
    let root = absolutize(root, cwd);
    let out_dir = absolutize(out_dir, cwd);
    if out_dir.starts_with(&root) && out_dir != root {
        return Ok(out_dir);
    }
    Err(PluginError::Failed(format!(
        "refusing to clean '{}': it is not inside the project root '{}'",
        out_dir.display(),
        root.display()
    )))
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        cwd.join(path).clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{BuildConfig, ConfigResolver, ProjectConfig};
    use serde_json::json;
    use tempfile::TempDir;

    fn config_for(root: &Path, output_dir: &str) -> BuildConfig {
        let project = ProjectConfig::from_value(json!({
            "base_path": ".",
            "output": { "dir": output_dir }
        }))
        .unwrap();
        ConfigResolver::new(project, root)
            .resolve_str("production")
            .unwrap()
    }

    #[tokio::test]
    async fn removes_stale_files_but_keeps_listed_names() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        std::fs::create_dir_all(out.join("old-chunks")).unwrap();
        std::fs::write(out.join("stale.js"), "x").unwrap();
        std::fs::write(out.join(".gitkeep"), "").unwrap();

        let config = config_for(dir.path(), "dist");
        let plugin = CleanPlugin::new(CleanOptions {
            dry: false,
            keep: vec![".gitkeep".to_string()],
        });
        plugin.before_run(&mut HookContext::new(&config)).await.unwrap();

        assert!(out.join(".gitkeep").exists());
        assert!(!out.join("stale.js").exists());
        assert!(!out.join("old-chunks").exists());
    }

    #[tokio::test]
    async fn dry_run_removes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("stale.js"), "x").unwrap();

        let config = config_for(dir.path(), "dist");
        let plugin = CleanPlugin::new(CleanOptions {
            dry: true,
            keep: vec![],
        });
        plugin.before_run(&mut HookContext::new(&config)).await.unwrap();

        assert!(out.join("stale.js").exists());
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path(), "build/out");

        CleanPlugin::new(CleanOptions::default())
            .before_run(&mut HookContext::new(&config))
            .await
            .unwrap();

        assert!(dir.path().join("build/out").is_dir());
    }

    #[tokio::test]
    async fn refuses_directories_outside_the_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("project");
        std::fs::create_dir_all(&root).unwrap();
        let config = config_for(&root, "../elsewhere");

        let err = CleanPlugin::new(CleanOptions::default())
            .before_run(&mut HookContext::new(&config))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("refusing to clean"));
        assert!(!dir.path().join("elsewhere").exists());
    }

    #[test]
    fn relative_roots_are_resolved_against_cwd() {
        let cwd = Path::new("/srv/app");
        let out = ensure_inside_root(Path::new("./static/js/dist"), Path::new("."), cwd).unwrap();
        assert_eq!(out, PathBuf::from("/srv/app/static/js/dist"));

        let out = ensure_inside_root(Path::new("static/js/dist"), Path::new("/srv/app"), cwd).unwrap();
        assert_eq!(out, PathBuf::from("/srv/app/static/js/dist"));

        assert!(ensure_inside_root(Path::new("./"), Path::new("."), cwd).is_err());
        assert!(ensure_inside_root(Path::new("../dist"), Path::new("."), cwd).is_err());
    }

    #[tokio::test]
    async fn relative_project_root_cleans_below_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let dir = tempfile::Builder::new().prefix("kiln-clean").tempdir_in(&cwd).unwrap();
        let rel_root = dir.path().strip_prefix(&cwd).unwrap().to_path_buf();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/stale.js"), "x").unwrap();

        let config = config_for(&rel_root, "dist");
        CleanPlugin::new(CleanOptions::default())
            .before_run(&mut HookContext::new(&config))
            .await
            .unwrap();

        assert!(!dir.path().join("dist/stale.js").exists());
    }
}
