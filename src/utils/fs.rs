//! File system utilities
//!
//! Helpers for the few file operations plugmeta performs itself:
//!
//! - **Atomic writes**: the plugin cache is replaced wholesale, never half-written
//! - **YAML I/O**: typed load/store of the cache and configuration files
//! - **Tree copies**: recursive copies that keep symbolic links as links, so that
//!   aliased modules inside a staged collection still resolve to their target

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// Returns an error if the path exists but is not a directory, or creation fails.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        anyhow::bail!("Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Writes a file atomically: content goes to a sibling temporary file which is then
/// renamed over the target.
///
/// Parent directories are created if needed. Readers either see the old content or
/// the new content, never a partial write.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Reads a UTF-8 text file.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Reads and parses a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not deserialize into `T`.
pub fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML from file: {}", path.display()))
}

/// Serializes `data` as YAML and writes it atomically.
pub fn write_yaml_file<T>(path: &Path, data: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let yaml = serde_yaml::to_string(data)
        .with_context(|| format!("Failed to serialize data to YAML for: {}", path.display()))?;

    atomic_write(path, yaml.as_bytes())
        .with_context(|| format!("Failed to write YAML file: {}", path.display()))
}

/// Copies a single directory entry, recreating symbolic links instead of following them.
///
/// Parent directories of `dst` are created as needed. Entries that vanished between
/// listing and copying are skipped.
pub fn copy_entry(src: &Path, dst: &Path) -> Result<()> {
    let Ok(metadata) = fs::symlink_metadata(src) else {
        tracing::debug!(target: "fs", "Skipping missing entry {}", src.display());
        return Ok(());
    };

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    if metadata.file_type().is_symlink() {
        let target = fs::read_link(src)
            .with_context(|| format!("Failed to read symlink: {}", src.display()))?;
        if crate::utils::platform::create_symlink(&target, dst).is_err() {
            // No symlink support: materialize the target instead.
            fs::copy(src, dst).with_context(|| {
                format!("Failed to copy {} to {}", src.display(), dst.display())
            })?;
        }
    } else if metadata.is_dir() {
        ensure_dir(dst)?;
    } else {
        fs::copy(src, dst).with_context(|| {
            format!("Failed to copy file from {} to {}", src.display(), dst.display())
        })?;
    }

    Ok(())
}

/// Recursively copies a directory tree.
///
/// Symbolic links inside the tree are recreated as links; the destination is created
/// if it doesn't exist.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else {
            copy_entry(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Returns `true` when `path` is a directory with no entries.
///
/// Unreadable directories count as empty.
pub fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).map(|mut entries| entries.next().is_none()).unwrap_or(true)
}
