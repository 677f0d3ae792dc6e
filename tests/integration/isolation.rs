//! The staging tree never outlives a refresh and never touches the source checkout.

use plugmeta_cli::config::ChangelogConfig;
use plugmeta_cli::core::PlugmetaError;
use plugmeta_cli::docs::AnsibleDocRunner;
use plugmeta_cli::plugins::cache::{LoadOptions, PluginLoader};
use plugmeta_cli::plugins::isolation::{CollectionCopier, CopyStrategy};
use plugmeta_cli::test_utils::{CollectionFixture, FakeDocRunner};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::common::{playbook_dir, staged_collection};

fn fixture() -> CollectionFixture {
    let fixture = CollectionFixture::new("ns", "coll").unwrap();
    fixture.add_module("ping.py").unwrap();
    fixture.add_plugin("lookup", "secret.py").unwrap();
    fixture
}

fn tree(root: &std::path::Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    entries.sort();
    entries
}

#[tokio::test]
async fn test_staging_removed_after_refresh() {
    let fixture = fixture();
    let before = tree(fixture.root());

    let runner = FakeDocRunner::new(|args| {
        let staged = staged_collection(&playbook_dir(args).unwrap(), "ns", "coll");
        assert!(staged.join("plugins/modules/ping.py").is_file());
        Ok(r#"{"all": {"module": {"ns.coll.ping": {"doc": {"short_description": "Ping"}}}}}"#.to_string())
    });
    let loader = PluginLoader::new(
        fixture.paths().with_core_version("2.15.0"),
        Some(fixture.details()),
        ChangelogConfig::default(),
        runner.clone(),
    )
    .with_copy_strategy(CopyStrategy::Plain);

    let plugins = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    assert_eq!(plugins.len(), 1);

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let staging = playbook_dir(&calls[0]).unwrap();
    assert!(!staging.exists());

    let mut after = tree(fixture.root());
    after.retain(|p| p != &PathBuf::from("changelogs/.plugin-cache.yaml"));
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_staging_removed_after_tool_failure() {
    let fixture = fixture();
    let runner = FakeDocRunner::new(|args| {
        assert!(playbook_dir(args).unwrap().exists());
        Err(PlugmetaError::DocToolFailed {
            operation: "--metadata-dump".to_string(),
            stderr: "ERROR! simulated".to_string(),
        }
        .into())
    });
    let loader = PluginLoader::new(
        fixture.paths().with_core_version("2.15.0"),
        Some(fixture.details()),
        ChangelogConfig::default(),
        runner.clone(),
    )
    .with_copy_strategy(CopyStrategy::Plain);

    let err = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlugmetaError>(),
        Some(PlugmetaError::DocToolFailed { .. })
    ));

    let staging = playbook_dir(&runner.calls()[0]).unwrap();
    assert!(!staging.exists());
    assert!(!loader.cache_path().exists());
}

#[tokio::test]
async fn test_staging_removed_after_invalid_output() {
    let fixture = fixture();
    let runner = FakeDocRunner::new(|_| Ok("Traceback (most recent call last):".to_string()));
    let loader = PluginLoader::new(
        fixture.paths().with_core_version("2.16.0"),
        Some(fixture.details()),
        ChangelogConfig::default(),
        runner.clone(),
    )
    .with_copy_strategy(CopyStrategy::Plain);

    let err = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlugmetaError>(),
        Some(PlugmetaError::DocOutputInvalid { .. })
    ));
    assert!(!playbook_dir(&runner.calls()[0]).unwrap().exists());
}

#[tokio::test]
async fn test_concurrent_stagings_are_independent() {
    let fixture = fixture();
    let copier = CollectionCopier::new(fixture.root(), "ns", "coll");

    let (first, second) = tokio::join!(copier.stage(), copier.stage());
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.playbook_dir(), second.playbook_dir());

    let first_dir = first.playbook_dir().to_path_buf();
    drop(first);
    assert!(!first_dir.exists());
    assert!(second.collection_dir().join("plugins/modules/ping.py").is_file());
}

#[tokio::test]
async fn test_staging_removed_when_future_is_cancelled() {
    let fixture = fixture();
    let copier = CollectionCopier::new(fixture.root(), "ns", "coll");
    let (tx, rx) = tokio::sync::oneshot::channel();

    let task = tokio::spawn(async move {
        let staged = copier.stage().await.unwrap();
        let _ = tx.send(staged.playbook_dir().to_path_buf());
        std::future::pending::<()>().await;
        drop(staged);
    });

    let staging = rx.await.unwrap();
    assert!(staging.exists());
    task.abort();
    let _ = task.await;
    assert!(!staging.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_staging_removed_after_timeout() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = fixture();
    let bin = tempfile::TempDir::new().unwrap();
    let recorded = bin.path().join("args.txt");
    let script = bin.path().join("ansible-doc");
    std::fs::write(
        &script,
        format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexec sleep 5\n", recorded.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let runner = AnsibleDocRunner::new(&script).with_timeout(Some(Duration::from_secs(1)));
    let loader = PluginLoader::new(
        fixture.paths().with_core_version("2.15.0"),
        Some(fixture.details()),
        ChangelogConfig::default(),
        runner,
    )
    .with_copy_strategy(CopyStrategy::Plain);

    let start = Instant::now();
    let err = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap_err();
    assert!(start.elapsed() < Duration::from_secs(3));
    assert!(matches!(
        err.downcast_ref::<PlugmetaError>(),
        Some(PlugmetaError::DocToolFailed { .. })
    ));

    let args: Vec<String> = std::fs::read_to_string(&recorded).unwrap().lines().map(String::from).collect();
    assert_eq!(args[0], "--metadata-dump");
    let staging = playbook_dir(&args).unwrap();
    assert!(!staging.exists());
    assert!(!loader.cache_path().exists());
}
