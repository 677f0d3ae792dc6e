//! Platform-specific helpers: symlinks, executable lookup and path arithmetic.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

use crate::core::PlugmetaError;

/// Creates a symbolic link at `link` pointing to `target`.
///
/// On Windows a directory or file link is chosen based on what `target` resolves to
/// (relative targets are resolved against the link's parent). Fails when the
/// platform or filesystem does not permit symlinks.
pub fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        let resolved = match link.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target.to_path_buf(),
        };
        if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, link);
        Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "symlinks are not supported"))
    }
}

/// Resolves symlinks in `path`, returning the path unchanged if it cannot be resolved
/// (for example because it doesn't exist).
#[must_use]
pub fn canonicalize_or_self(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Computes `path` relative to `base`, inserting `..` components where `path` leaves
/// `base`. Both paths are compared component-wise without touching the filesystem.
///
/// ```rust
/// use plugmeta_cli::utils::platform::relative_path;
/// use std::path::Path;
///
/// assert_eq!(relative_path(Path::new("/a/b/c"), Path::new("/a")), Path::new("b/c"));
/// assert_eq!(relative_path(Path::new("/a/x"), Path::new("/a/b")), Path::new("../x"));
/// ```
#[must_use]
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<Component<'_>> = path.components().collect();
    let base_components: Vec<Component<'_>> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_components.len() {
        result.push("..");
    }
    for component in &path_components[common..] {
        result.push(component.as_os_str());
    }
    result
}

/// Locates an executable, either as an explicit path or by searching `PATH`.
///
/// # Errors
///
/// Returns [`PlugmetaError::DocToolNotFound`] when nothing executable is found.
pub fn resolve_executable(program: &Path) -> Result<PathBuf> {
    which::which(program).map_err(|_| {
        PlugmetaError::DocToolNotFound {
            path: program.display().to_string(),
        }
        .into()
    })
}
