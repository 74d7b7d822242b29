//! Atomic, path-checked writing of an [`OutputBundle`].
//!
//! Every filename is normalized with `path_clean` and must stay under the
//! output directory. Files are first written next to their target with a
//! `.tmp` suffix and renamed only once all writes succeeded. Files being
//! replaced are parked with a `.bak` suffix during the renames; if one rename
//! fails, the already renamed files are removed and the parked ones restored,
//! so a failed build never leaves a partial set of bundles behind.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::{debug, warn};

use crate::asset::OutputBundle;
use crate::{Error, Result};

/// Writes every asset of `bundle` under `dir`, creating it if needed.
///
/// Returns the absolute paths written, in bundle order.
pub fn write_bundle_to(bundle: &OutputBundle, dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = validate_and_normalize_dir(dir)?;

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut operations = Vec::with_capacity(bundle.len());
    for asset in bundle.iter() {
        let target_path = validate_output_path(&dir, &asset.filename)?;
        operations.push((target_path, asset.source.as_slice()));
    }

    write_files_atomic(&operations)?;

    debug!(dir = %dir.display(), files = operations.len(), "wrote bundle");
    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();

    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    let cwd = std::env::current_dir()
        .map_err(|e| Error::InvalidOutputPath(format!("Failed to get current directory: {e}")))?;
    Ok(cwd.join(&cleaned).clean())
}

/// Resolves `filename` under `base_dir`, rejecting anything that escapes it.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("Filename is empty".to_string()));
    }

    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let filename_path = Path::new(filename).clean();
    let full_path = base_dir.join(&filename_path).clean();

    // Joining an absolute filename replaces the base, so this also catches `/etc/passwd`
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::new();

    // Phase 1: write temporary files
    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = temp_path_for(target_path);
        fs::write(&temp_path, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        temp_files.push((temp_path, target_path.clone()));
    }

    // Phase 2: rename into place
    commit(&temp_files, |from, to| fs::rename(from, to))
}

fn backup_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// A target that has been replaced, plus where its previous content is parked.
struct Committed {
    target: PathBuf,
    backup: Option<PathBuf>,
}

fn commit<F>(temp_files: &[(PathBuf, PathBuf)], mut rename: F) -> Result<()>
where
    F: FnMut(&Path, &Path) -> std::io::Result<()>,
{
    let mut committed: Vec<Committed> = Vec::with_capacity(temp_files.len());

    for (temp_path, target_path) in temp_files {
        let backup = if target_path.is_file() {
            let backup = backup_path_for(target_path);
            if let Err(e) = rename(target_path, &backup) {
                rollback(&committed, &mut rename);
                cleanup_temp_files(temp_files);
                return Err(Error::WriteFailure(format!(
                    "Failed to move aside '{}': {}",
                    target_path.display(),
                    e
                )));
            }
            Some(backup)
        } else {
            None
        };

        if let Err(e) = rename(temp_path, target_path) {
            if let Some(backup) = &backup {
                restore(backup, target_path, &mut rename);
            }
            rollback(&committed, &mut rename);
            cleanup_temp_files(temp_files);
            return Err(Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            )));
        }

        committed.push(Committed {
            target: target_path.clone(),
            backup,
        });
    }

    for backup in committed.iter().filter_map(|c| c.backup.as_ref()) {
        if let Err(e) = fs::remove_file(backup) {
            warn!("Failed to remove backup '{}': {}", backup.display(), e);
        }
    }

    Ok(())
}

/// Undo committed renames, newest first.
fn rollback<F>(committed: &[Committed], rename: &mut F)
where
    F: FnMut(&Path, &Path) -> std::io::Result<()>,
{
    for entry in committed.iter().rev() {
        if let Err(e) = fs::remove_file(&entry.target) {
            warn!("Failed to remove '{}' during rollback: {}", entry.target.display(), e);
        }
        if let Some(backup) = &entry.backup {
            restore(backup, &entry.target, rename);
        }
    }
}

fn restore<F>(backup: &Path, target: &Path, rename: &mut F)
where
    F: FnMut(&Path, &Path) -> std::io::Result<()>,
{
    if let Err(e) = rename(backup, target) {
        warn!(
            "Failed to restore '{}' from '{}': {}",
            target.display(),
            backup.display(),
            e
        );
    }
}

/// Best-effort removal; we are already on an error path.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                warn!(
                    "Failed to clean up temporary file '{}': {}",
                    temp_path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use tempfile::TempDir;

    #[test]
    fn test_validate_output_path_normal() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, "index.js");
        assert_eq!(result.unwrap(), Path::new("/tmp/output/index.js"));
    }

    #[test]
    fn test_validate_output_path_nested() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, "chunks/vendor.js");
        assert_eq!(result.unwrap(), Path::new("/tmp/output/chunks/vendor.js"));
    }

    #[test]
    fn test_validate_output_path_traversal() {
        let base = Path::new("/tmp/output");
        assert!(matches!(
            validate_output_path(base, "../etc/passwd"),
            Err(Error::InvalidOutputPath(_))
        ));
        assert!(validate_output_path(base, "safe/../../../../etc/passwd").is_err());
        assert!(validate_output_path(base, "/etc/passwd").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_directory_itself() {
        let base = Path::new("/tmp/output");
        assert!(validate_output_path(base, ".").is_err());
        assert!(validate_output_path(base, "").is_err());
    }

    #[test]
    fn test_validate_output_path_null_byte() {
        let base = Path::new("/tmp/output");
        assert!(validate_output_path(base, "file\0name.js").is_err());
    }

    #[test]
    fn temp_names_do_not_collide_across_extensions() {
        assert_ne!(
            temp_path_for(Path::new("/out/main.js")),
            temp_path_for(Path::new("/out/main.json"))
        );
    }

    #[test]
    fn writes_all_assets_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");

        let mut bundle = OutputBundle::new();
        bundle.push(Asset::entry("main", "main.js", b"console.log(1);".to_vec()));
        bundle.push(Asset::auxiliary("manifest.json", b"{}".to_vec()));

        let written = write_bundle_to(&bundle, &out).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(out.join("main.js")).unwrap(), "console.log(1);");

        let leftovers: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn traversal_aborts_before_anything_is_written() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");

        let mut bundle = OutputBundle::new();
        bundle.push(Asset::entry("main", "main.js", b"ok".to_vec()));
        bundle.push(Asset::auxiliary("../escape.json", b"{}".to_vec()));

        assert!(write_bundle_to(&bundle, &out).is_err());
        assert!(!out.join("main.js").exists());
        assert!(!dir.path().join("escape.json").exists());
    }

    #[test]
    fn failed_rename_restores_previous_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("main.js"), "old main").unwrap();

        let temp_files: Vec<(PathBuf, PathBuf)> = ["main.js", "admin.js"]
            .iter()
            .map(|name| {
                let target = out.join(name);
                let temp = temp_path_for(&target);
                fs::write(&temp, format!("new {name}")).unwrap();
                (temp, target)
            })
            .collect();

        let failing_temp = temp_files[1].0.clone();
        let err = commit(&temp_files, |from, to| {
            if from == failing_temp {
                Err(std::io::Error::other("disk full"))
            } else {
                fs::rename(from, to)
            }
        })
        .unwrap_err();

        assert!(matches!(err, Error::WriteFailure(_)));
        assert_eq!(fs::read_to_string(out.join("main.js")).unwrap(), "old main");
        assert!(!out.join("admin.js").exists());

        let mut names: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["main.js"]);
    }

    #[test]
    fn replacing_existing_files_leaves_no_backups() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("main.js"), "old").unwrap();

        let mut bundle = OutputBundle::new();
        bundle.push(Asset::entry("main", "main.js", b"new".to_vec()));
        write_bundle_to(&bundle, &out).unwrap();

        assert_eq!(fs::read_to_string(out.join("main.js")).unwrap(), "new");
        assert!(!out.join("main.js.bak").exists());
    }
}
