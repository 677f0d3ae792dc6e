//! Throwaway project trees for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{CollectionDetails, PathsConfig, ProjectKind};

fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}

fn plugin_source(name: &str) -> String {
    format!("DOCUMENTATION = r'''\nshort_description: {name}\n'''\n")
}

/// A collection checkout with `galaxy.yml` and a `changelogs/` directory.
pub struct CollectionFixture {
    pub dir: TempDir,
    namespace: String,
    name: String,
}

impl CollectionFixture {
    /// Creates a collection at version `1.0.0`.
    pub fn new(namespace: &str, name: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        write_file(
            &dir.path().join("galaxy.yml"),
            &format!("namespace: {namespace}\nname: {name}\nversion: 1.0.0\n"),
        )?;
        fs::create_dir_all(dir.path().join("changelogs"))?;
        Ok(Self {
            dir,
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Root of the collection.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Adds a module at `relative` below `plugins/modules`, e.g. `cloud/ec2.py`.
    pub fn add_module(&self, relative: &str) -> Result<PathBuf> {
        let path = self.root().join("plugins").join("modules").join(relative);
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        write_file(&path, &plugin_source(&stem))
    }

    /// Adds a plugin file below `plugins/<plugin_type>`.
    pub fn add_plugin(&self, plugin_type: &str, file_name: &str) -> Result<PathBuf> {
        let path = self.root().join("plugins").join(plugin_type).join(file_name);
        write_file(&path, &plugin_source(file_name))
    }

    /// Adds a role with an argument spec.
    pub fn add_role(&self, role: &str) -> Result<PathBuf> {
        let path = self.root().join("roles").join(role).join("meta").join("argument_specs.yml");
        write_file(&path, "argument_specs:\n  main:\n    short_description: role\n")
    }

    /// Paths configuration for this collection.
    pub fn paths(&self) -> PathsConfig {
        PathsConfig::new(self.root(), ProjectKind::Collection)
    }

    /// Collection details matching `galaxy.yml`.
    pub fn details(&self) -> CollectionDetails {
        CollectionDetails::new(&self.namespace, &self.name).with_version("1.0.0")
    }

    /// `<namespace>.<name>`
    pub fn fqcn(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// An ansible-core checkout with `lib/ansible/release.py`.
pub struct CoreFixture {
    pub dir: TempDir,
}

impl CoreFixture {
    /// Creates a checkout whose release file reports `version`.
    pub fn new(version: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        write_file(
            &dir.path().join("lib").join("ansible").join("release.py"),
            &format!("__version__ = '{version}'\n__author__ = 'Ansible, Inc.'\n"),
        )?;
        fs::create_dir_all(dir.path().join("changelogs"))?;
        Ok(Self {
            dir,
        })
    }

    /// Root of the checkout.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Adds a module at `relative` below `lib/ansible/modules`.
    pub fn add_module(&self, relative: &str) -> Result<PathBuf> {
        let path = self.root().join("lib").join("ansible").join("modules").join(relative);
        write_file(&path, &plugin_source(relative))
    }

    /// Adds a plugin file below `lib/ansible/plugins/<plugin_type>`.
    pub fn add_plugin(&self, plugin_type: &str, file_name: &str) -> Result<PathBuf> {
        let path =
            self.root().join("lib").join("ansible").join("plugins").join(plugin_type).join(file_name);
        write_file(&path, &plugin_source(file_name))
    }

    /// Paths configuration for this checkout.
    pub fn paths(&self) -> PathsConfig {
        PathsConfig::new(self.root(), ProjectKind::Core)
    }
}
