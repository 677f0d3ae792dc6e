//! Cache hits, misses and refreshes for an ansible-core checkout (pre-2.13 tooling).

use plugmeta_cli::config::{ChangelogConfig, PathsConfig};
use plugmeta_cli::plugins::cache::{LoadOptions, PluginCacheFile, PluginLoader};
use plugmeta_cli::plugins::PluginCategory;
use plugmeta_cli::test_utils::{CoreFixture, FakeDocRunner, init_test_logging};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{doc, legacy_runner, positional_names, read_cache_yaml};

fn core_project() -> CoreFixture {
    let fixture = CoreFixture::new("2.12.4").unwrap();
    fixture.add_module("copy.py").unwrap();
    fixture.add_module("net/ping.py").unwrap();
    fixture.add_module("async_wrapper.py").unwrap();
    fixture.add_module("__init__.py").unwrap();
    fixture.add_plugin("lookup", "file.py").unwrap();
    fixture.add_plugin("cache", "base.py").unwrap();
    fixture.add_plugin("cache", "memory.py").unwrap();
    fixture
}

fn core_runner(root: PathBuf) -> FakeDocRunner {
    legacy_runner("ansible-doc [core 2.12.4]", move |plugin_type, name, _| {
        if plugin_type == "module" {
            let relative = if name == "ping" { "net/ping.py".to_string() } else { format!("{name}.py") };
            let filename = root.join("lib/ansible/modules").join(relative);
            return Some(json!({
                "doc": {
                    "filename": filename,
                    "short_description": format!("The {name} module"),
                    "version_added": "historical"
                }
            }));
        }
        Some(doc(&format!("The {name} {plugin_type} plugin"), None))
    })
}

fn loader(fixture: &CoreFixture, runner: FakeDocRunner) -> PluginLoader<FakeDocRunner> {
    PluginLoader::new(fixture.paths(), None, ChangelogConfig::default(), runner)
}

#[tokio::test]
async fn test_cache_round_trip() {
    init_test_logging(None);
    let fixture = core_project();
    let runner = core_runner(fixture.root().to_path_buf());
    let loader = loader(&fixture, runner.clone());

    let first = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    let order: Vec<(&str, &str)> =
        first.iter().map(|p| (p.plugin_type.as_str(), p.name.as_str())).collect();
    assert_eq!(
        order,
        vec![("cache", "memory"), ("lookup", "file"), ("module", "copy"), ("module", "ping")]
    );
    assert!(first.iter().all(|p| p.category == PluginCategory::Plugin));
    assert_eq!(runner.call_count(), 3);

    let cache_path = fixture.root().join("changelogs").join(".plugin-cache.yaml");
    assert!(cache_path.is_file());
    let stored = PluginCacheFile::load(&cache_path).unwrap();
    assert_eq!(stored.version, "1.0.0");

    let second = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(runner.call_count(), 3);
}

#[tokio::test]
async fn test_exclusions_and_flattening() {
    let fixture = core_project();
    let runner = core_runner(fixture.root().to_path_buf());
    loader(&fixture, runner.clone()).load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();

    let calls = runner.calls();
    let module_call = calls.iter().find(|args| args.contains(&"module".to_string())).unwrap();
    assert_eq!(positional_names(module_call), vec!["copy", "ping"]);
    let cache_call = calls.iter().find(|args| args.contains(&"cache".to_string())).unwrap();
    assert_eq!(positional_names(cache_call), vec!["memory"]);
    assert!(calls.iter().all(|args| !args.contains(&"--playbook-dir".to_string())));
}

#[tokio::test]
async fn test_core_module_namespaces() {
    let fixture = core_project();
    let runner = core_runner(fixture.root().to_path_buf());
    let plugins = loader(&fixture, runner).load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();

    let copy = plugins.iter().find(|p| p.name == "copy").unwrap();
    assert_eq!(copy.namespace.as_deref(), Some(""));
    assert_eq!(copy.version_added.as_deref(), Some("historical"));
    let ping = plugins.iter().find(|p| p.name == "ping").unwrap();
    assert_eq!(ping.namespace.as_deref(), Some("net"));
    let file = plugins.iter().find(|p| p.name == "file").unwrap();
    assert_eq!(file.namespace, None);

    let yaml = read_cache_yaml(&fixture.root().join("changelogs/.plugin-cache.yaml"));
    let lookup = &yaml["plugins"]["lookup"]["file"];
    assert!(lookup.get("namespace").is_none());
    assert!(lookup.get("version_added").is_some());
    assert_eq!(yaml["plugins"]["module"]["ping"]["namespace"].as_str(), Some("net"));
    assert!(yaml["plugins"]["become"].as_mapping().is_some_and(|m| m.is_empty()));
}

#[tokio::test]
async fn test_version_mismatch_refreshes() {
    let fixture = core_project();
    let runner = core_runner(fixture.root().to_path_buf());
    let loader = loader(&fixture, runner.clone());

    loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    assert_eq!(runner.call_count(), 3);

    loader.load_plugins("1.1.0", &LoadOptions::default()).await.unwrap();
    assert_eq!(runner.call_count(), 6);
    let stored = PluginCacheFile::load(loader.cache_path()).unwrap();
    assert_eq!(stored.version, "1.1.0");
}

#[tokio::test]
async fn test_force_reload_ignores_cache() {
    let fixture = core_project();
    let runner = core_runner(fixture.root().to_path_buf());
    let loader = loader(&fixture, runner.clone());

    loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    let options = LoadOptions {
        force_reload: true,
        ..LoadOptions::default()
    };
    loader.load_plugins("1.0.0", &options).await.unwrap();
    assert_eq!(runner.call_count(), 6);
}

#[tokio::test]
async fn test_malformed_cache_is_rebuilt() {
    let fixture = core_project();
    let cache_path = fixture.root().join("changelogs/.plugin-cache.yaml");

    for content in ["version: [unclosed\n", "plugins: {}\n", "- just\n- a list\n"] {
        fs::write(&cache_path, content).unwrap();
        let runner = core_runner(fixture.root().to_path_buf());
        let plugins =
            loader(&fixture, runner.clone()).load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
        assert_eq!(plugins.len(), 4);
        assert_eq!(runner.call_count(), 3);
        assert_eq!(PluginCacheFile::load(&cache_path).unwrap().version, "1.0.0");
    }
}

#[tokio::test]
async fn test_cached_data_is_used_verbatim() {
    let fixture = core_project();
    fs::write(
        fixture.root().join("changelogs/.plugin-cache.yaml"),
        "version: 2.0.0\nplugins:\n  module:\n    stat:\n      description: Retrieve file status\n      name: stat\n      namespace: files\n      version_added: historical\nobjects:\n  role:\n    setup:\n      description: Set things up\n      name: setup\n      version_added: null\n",
    )
    .unwrap();

    let loader = loader(&fixture, FakeDocRunner::failing("must not run"));
    let options = LoadOptions {
        add_plugin_period: true,
        ..LoadOptions::default()
    };
    let plugins = loader.load_plugins("2.0.0", &options).await.unwrap();
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins[0].name, "stat");
    assert_eq!(plugins[0].namespace.as_deref(), Some("files"));
    assert_eq!(plugins[0].description.as_deref(), Some("Retrieve file status."));
    assert_eq!(plugins[1].category, PluginCategory::Object);
    assert_eq!(plugins[1].plugin_type, "role");
}

#[tokio::test]
async fn test_period_from_changelog_config() {
    let fixture = core_project();
    let runner = core_runner(fixture.root().to_path_buf());
    let config = ChangelogConfig {
        add_plugin_period: true,
        ..ChangelogConfig::default()
    };
    let loader = PluginLoader::new(fixture.paths(), None, config, runner);

    let plugins = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    assert!(plugins.iter().all(|p| p.description.as_deref().is_some_and(|d| d.ends_with('.'))));

    let stored = PluginCacheFile::load(loader.cache_path()).unwrap();
    assert_eq!(stored.plugins["module"]["copy"].description.as_deref(), Some("The copy module"));
}

#[tokio::test]
async fn test_other_project_runs_no_tool() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("setup.py"), "").unwrap();
    let paths = PathsConfig::detect(temp.path());
    assert!(paths.is_other_project());

    let runner = FakeDocRunner::failing("must not run");
    let loader = PluginLoader::new(paths, None, ChangelogConfig::default(), runner.clone());
    let plugins = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();

    assert!(plugins.is_empty());
    assert_eq!(runner.call_count(), 0);
    assert!(!temp.path().join("changelogs").exists());
}

#[tokio::test]
async fn test_tool_failure_keeps_previous_cache() {
    let fixture = core_project();
    let runner = core_runner(fixture.root().to_path_buf());
    let loader_ok = loader(&fixture, runner);
    loader_ok.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    let before = fs::read_to_string(loader_ok.cache_path()).unwrap();

    let failing = loader(&fixture, FakeDocRunner::failing("ERROR! boom"));
    assert!(failing.load_plugins("1.1.0", &LoadOptions::default()).await.is_err());
    assert_eq!(fs::read_to_string(failing.cache_path()).unwrap(), before);
}
