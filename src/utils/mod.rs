//! Utility modules for plugmeta
//!
//! - [`fs`] - atomic writes, YAML load/store and symlink-preserving tree copies
//! - [`platform`] - symlink creation, executable lookup and relative path computation

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, copy_dir, ensure_dir, read_yaml_file, write_yaml_file};
pub use platform::{canonicalize_or_self, relative_path, resolve_executable};
