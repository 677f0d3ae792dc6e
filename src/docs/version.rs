//! ansible-core version detection
//!
//! The output format of `ansible-doc` changed with ansible-core 2.13, which added
//! `--metadata-dump`. Detection first looks at the release string of the host
//! framework (an explicit hint, or `lib/ansible/release.py` in a core checkout) and
//! only then asks `ansible-doc --version`.
//!
//! ansible-core uses PEP 440 version strings (`2.13.0.dev0`, `2.14.0rc1`, `2.9`).
//! [`CoreVersion`] maps them onto [`semver::Version`] in an order-preserving way:
//! the pre-release phase becomes a numeric rank (`dev` < `a` < `b` < `rc`) followed by
//! its number, so plain semver comparison gives PEP 440 ordering.

use anyhow::Result;
use regex::Regex;
use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;

use super::DocToolRunner;
use crate::config::{PathsConfig, ProjectKind};
use crate::core::PlugmetaError;

/// First ansible-core version whose `ansible-doc` supports `--metadata-dump`.
pub const METADATA_DUMP_MIN_VERSION: &str = "2.13.0.dev0";

/// `--version` output formats, tried in order.
const VERSION_OUTPUT_PATTERNS: [&str; 2] =
    [r"^ansible-doc \[(?:core|base) ([^\]]+)\]", r"^ansible-doc ([^\s]+)"];

/// An ansible-core release version.
#[derive(Debug, Clone)]
pub struct CoreVersion {
    raw: String,
    key: Version,
}

impl CoreVersion {
    /// Parses a PEP 440 style version string.
    ///
    /// ```rust
    /// use plugmeta_cli::docs::version::CoreVersion;
    ///
    /// let dev = CoreVersion::parse("2.13.0.dev0").unwrap();
    /// let beta = CoreVersion::parse("2.13.0b1").unwrap();
    /// let release = CoreVersion::parse("2.13.0").unwrap();
    /// assert!(dev < beta && beta < release);
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let unparseable = || PlugmetaError::ToolVersionUnparseable {
            output: input.to_string(),
        };

        let re = Regex::new(
            r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.\d+)*(?:[-_.]?(dev|a|alpha|b|beta|c|rc|pre|preview)[-_.]?(\d*))?(?:[-_.]?(?:post|rev|r)[-_.]?\d*)?(?:[-_.]?dev[-_.]?\d*)?(?:\+[a-z0-9.]+)?$",
        )?;
        let normalized = input.trim().to_lowercase();
        let caps = re.captures(&normalized).ok_or_else(unparseable)?;

        let number = |idx: usize| -> Result<u64> {
            caps.get(idx).map_or(Ok(0), |m| m.as_str().parse::<u64>().map_err(|_| unparseable().into()))
        };

        let mut key = Version::new(number(1)?, number(2)?, number(3)?);
        if let Some(phase) = caps.get(4) {
            let rank = match phase.as_str() {
                "dev" => 0,
                "a" | "alpha" => 1,
                "b" | "beta" => 2,
                _ => 3,
            };
            let serial = caps
                .get(5)
                .filter(|m| !m.as_str().is_empty())
                .map_or(Ok(0), |m| m.as_str().parse::<u64>())
                .map_err(|_| unparseable())?;
            key.pre = Prerelease::new(&format!("{rank}.{serial}"))?;
        }

        Ok(Self {
            raw: input.trim().to_string(),
            key,
        })
    }

    /// The version as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` when this version's `ansible-doc` supports `--metadata-dump`.
    #[must_use]
    pub fn supports_metadata_dump(&self) -> bool {
        Self::parse(METADATA_DUMP_MIN_VERSION).is_ok_and(|threshold| *self >= threshold)
    }
}

impl PartialEq for CoreVersion {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CoreVersion {}

impl PartialOrd for CoreVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CoreVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for CoreVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Extracts the version from `ansible-doc --version` output.
///
/// Accepts both `ansible-doc [core 2.15.3]` (ansible-core/-base) and
/// `ansible-doc 2.9.27` (Ansible 2.9 and older).
pub fn parse_version_output(output: &str) -> Result<CoreVersion> {
    for pattern in VERSION_OUTPUT_PATTERNS {
        let re = Regex::new(pattern)?;
        if let Some(version) = re.captures(output).and_then(|caps| caps.get(1)) {
            return CoreVersion::parse(version.as_str()).map_err(|_| {
                PlugmetaError::ToolVersionUnparseable {
                    output: output.to_string(),
                }
                .into()
            });
        }
    }

    Err(PlugmetaError::ToolVersionUnparseable {
        output: output.to_string(),
    }
    .into())
}

/// Extracts `__version__` from the content of ansible's `release.py`.
#[must_use]
pub fn parse_release_file(content: &str) -> Option<String> {
    let re = Regex::new(r#"(?m)^__version__\s*=\s*['"]([^'"]+)['"]"#).ok()?;
    re.captures(content).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Reads the release string exposed by the host framework without running any tool.
fn host_release(paths: &PathsConfig) -> Option<CoreVersion> {
    if let Some(ref hint) = paths.core_version {
        match CoreVersion::parse(hint) {
            Ok(version) => return Some(version),
            Err(e) => tracing::warn!(target: "docs", "Ignoring ansible-core version hint {hint:?}: {e}"),
        }
    }

    if paths.kind == ProjectKind::Core {
        let release_file = paths.core_release_file();
        let content = std::fs::read_to_string(&release_file).ok()?;
        let version = parse_release_file(&content)?;
        return CoreVersion::parse(&version).ok();
    }

    None
}

/// Determines the ansible-core version behind the configured `ansible-doc`.
///
/// # Errors
///
/// Propagates tool failures and returns [`PlugmetaError::ToolVersionUnparseable`] when
/// the `--version` output matches neither known format.
pub async fn detect_core_version<R: DocToolRunner>(paths: &PathsConfig, runner: &R) -> Result<CoreVersion> {
    if let Some(version) = host_release(paths) {
        tracing::debug!(target: "docs", "Using host ansible-core release {}", version);
        return Ok(version);
    }

    let output = runner.run(vec!["--version".to_string()]).await?;
    let version = parse_version_output(&output)?;
    tracing::debug!(target: "docs", "ansible-doc reports ansible-core {}", version);
    Ok(version)
}
