//! plugmeta - Ansible plugin metadata cache
//!
//! Collects short metadata (name, namespace, description, version added) about every
//! plugin, module and role of an Ansible collection or an ansible-core checkout, and
//! caches it next to the changelog in `changelogs/.plugin-cache.yaml`. Changelog
//! tooling renders "New Modules" / "New Plugins" sections from that cache.
//!
//! # Architecture Overview
//!
//! All documentation comes from `ansible-doc`, in one of two shapes depending on the
//! ansible-core version:
//! - ansible-core 2.13 and newer: a single `--metadata-dump` call
//! - older releases: one `--list` (or a filesystem walk) plus one `--json` call per
//!   plugin type
//!
//! Collections are documented from a temporary copy staged under an
//! `ansible_collections/` tree, so the user's checkout is never touched and
//! `ansible-doc` cannot pick up an installed copy of the same collection.
//!
//! # Core Modules
//!
//! - [`plugins`] - enumeration, documentation fetching, normalization, staging and
//!   the cache controller
//! - [`docs`] - the `ansible-doc` command builder, the [`docs::DocToolRunner`] seam
//!   and ansible-core version detection
//! - [`config`] - project layout, `galaxy.yml` and changelog configuration
//! - [`core`] - error types and user-facing error rendering
//! - [`git`] - VCS detection and tracked-file listing for staging
//! - [`utils`] - file system and platform helpers
//! - [`cli`] - the `plugmeta` command line
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Refresh (if needed) and print plugin metadata of the collection in the current directory
//! plugmeta plugins
//!
//! # Force a refresh for an ansible-core checkout and print YAML
//! plugmeta --base-dir ~/src/ansible plugins --version 2.16.0 --force-reload --format yaml
//!
//! # Remove the cache file
//! plugmeta cache clear
//! ```

// Plugin metadata pipeline
pub mod docs;
pub mod plugins;

// Configuration and errors
pub mod config;
pub mod core;

// Supporting modules
pub mod cli;
pub mod git;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
