//! Backing-file IO for the hints document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Where hints land when no path was ever configured.
pub const DEFAULT_FILE: &str = "backup.yml";

/// Written to the working directory when the configured path cannot be
/// written, so edits are never lost.
pub const RECOVERY_FILE: &str = "recovery.yml";

/// The given path when present and non-empty, otherwise the default file.
pub fn resolve_path(path: Option<PathBuf>) -> PathBuf {
    match path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => PathBuf::from(DEFAULT_FILE),
    }
}

pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write the document to `path`; when that fails, fall back to the recovery
/// file. Returns the path actually written.
pub fn write(path: &Path, contents: &str) -> Result<PathBuf> {
    write_with_fallback(path, Path::new(RECOVERY_FILE), contents)
}

fn write_with_fallback(path: &Path, fallback: &Path, contents: &str) -> Result<PathBuf> {
    if fs::write(path, contents).is_ok() {
        return Ok(path.to_path_buf());
    }
    fs::write(fallback, contents).with_context(|| {
        format!(
            "failed to write {} and the recovery file {}",
            path.display(),
            fallback.display()
        )
    })?;
    Ok(fallback.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_path_defaults_when_missing_or_empty() {
        assert_eq!(resolve_path(None), PathBuf::from(DEFAULT_FILE));
        assert_eq!(resolve_path(Some(PathBuf::new())), PathBuf::from(DEFAULT_FILE));
        assert_eq!(
            resolve_path(Some(PathBuf::from("hints.yml"))),
            PathBuf::from("hints.yml")
        );
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hints.yml");
        let written = write(&path, "- itemprefix001:\n").unwrap();
        assert_eq!(written, path);
        assert_eq!(read(&path).unwrap(), "- itemprefix001:\n");
    }

    #[test]
    fn unwritable_destination_falls_back_to_recovery() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-dir").join("hints.yml");
        let fallback = dir.path().join("recovery.yml");
        let written = write_with_fallback(&missing, &fallback, "content\n").unwrap();
        assert_eq!(written, fallback);
        assert_eq!(fs::read_to_string(&fallback).unwrap(), "content\n");
    }

    #[test]
    fn double_failure_surfaces_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("a").join("hints.yml");
        let also_missing = dir.path().join("b").join("recovery.yml");
        assert!(write_with_fallback(&missing, &also_missing, "content").is_err());
    }

    #[test]
    fn read_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(read(&dir.path().join("absent.yml")).is_err());
    }
}
