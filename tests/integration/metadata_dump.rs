//! ansible-core version detection and the 2.13+ `--metadata-dump` path.

use plugmeta_cli::config::ChangelogConfig;
use plugmeta_cli::core::PlugmetaError;
use plugmeta_cli::plugins::PluginCategory;
use plugmeta_cli::plugins::cache::{LoadOptions, PluginLoader};
use plugmeta_cli::plugins::isolation::CopyStrategy;
use plugmeta_cli::test_utils::{CollectionFixture, CoreFixture, FakeDocRunner};
use serde_json::json;

use crate::common::{doc, legacy_runner, read_cache_yaml};

fn collection_dump() -> String {
    json!({
        "all": {
            "module": {
                "ns.coll.cloud.aws.ec2_instance": {"doc": {"short_description": "Create EC2 instances", "version_added": "1.1.0"}},
                "ns.coll.ping": {"doc": {"short_description": "Ping"}}
            },
            "lookup": {
                "ns.coll.secret": {"doc": {"short_description": "Read secrets", "version_added": 1.5}}
            },
            "role": {
                "ns.coll.web": {"entry_points": {"main": {"short_description": "Web server"}}}
            }
        },
        "errors": []
    })
    .to_string()
}

#[tokio::test]
async fn test_collection_metadata_dump() {
    let fixture = CollectionFixture::new("ns", "coll").unwrap();
    fixture.add_module("ping.py").unwrap();

    let runner = FakeDocRunner::new(|args| match args.first().map(String::as_str) {
        Some("--version") => Ok("ansible-doc [core 2.15.3]\n  config file = None\n".to_string()),
        Some("--metadata-dump") => Ok(collection_dump()),
        _ => panic!("unexpected invocation {args:?}"),
    });
    let loader = PluginLoader::new(
        fixture.paths(),
        Some(fixture.details()),
        ChangelogConfig::default(),
        runner.clone(),
    )
    .with_copy_strategy(CopyStrategy::Plain);

    let plugins = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], vec!["--version"]);
    assert_eq!(&calls[1][..3], &["--metadata-dump", "ns.coll", "--playbook-dir"]);
    assert_eq!(calls[1].len(), 4);

    let summary: Vec<(PluginCategory, &str, &str, Option<&str>)> = plugins
        .iter()
        .map(|p| (p.category, p.plugin_type.as_str(), p.name.as_str(), p.namespace.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (PluginCategory::Plugin, "lookup", "secret", None),
            (PluginCategory::Plugin, "module", "ec2_instance", Some("cloud.aws")),
            (PluginCategory::Plugin, "module", "ping", Some("")),
            (PluginCategory::Object, "role", "web", None),
        ]
    );
    assert_eq!(plugins[0].version_added.as_deref(), Some("1.5"));

    let yaml = read_cache_yaml(loader.cache_path());
    assert_eq!(yaml["version"].as_str(), Some("1.0.0"));
    assert!(yaml["plugins"]["lookup"]["secret"].get("namespace").is_none());
    assert_eq!(yaml["plugins"]["module"]["ping"]["namespace"].as_str(), Some(""));
    assert!(yaml["plugins"].get("callback").is_none());
    assert!(yaml["objects"]["role"]["web"].get("namespace").is_none());
}

#[tokio::test]
async fn test_core_metadata_dump_from_release_file() {
    let fixture = CoreFixture::new("2.16.0.dev0").unwrap();
    fixture.add_module("copy.py").unwrap();

    let runner = FakeDocRunner::new(|args| {
        assert_eq!(args, ["--metadata-dump", "ansible.builtin"]);
        Ok(json!({
            "all": {
                "module": {
                    "ansible.builtin.copy": {"doc": {"short_description": "Copy files to remote locations", "version_added": "historical"}},
                    "ansible.builtin._raw_params": {"doc": {"short_description": "Internal"}}
                },
                "filter": {
                    "ansible.builtin.to_json": {"doc": {"short_description": "Convert to JSON"}}
                }
            }
        })
        .to_string())
    });
    let loader = PluginLoader::new(fixture.paths(), None, ChangelogConfig::default(), runner.clone());
    let plugins = loader.load_plugins("2.16.0", &LoadOptions::default()).await.unwrap();

    assert_eq!(runner.call_count(), 1);
    let names: Vec<&str> = plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["to_json", "copy", "raw_params"]);
    assert!(plugins.iter().filter(|p| p.plugin_type == "module").all(|p| p.namespace.as_deref() == Some("")));
}

#[tokio::test]
async fn test_legacy_version_output_selects_per_type() {
    let fixture = CollectionFixture::new("ns", "coll").unwrap();
    fixture.add_plugin("filter", "json_query.py").unwrap();

    let runner = legacy_runner("ansible-doc 2.9.27\n  config file = /etc/ansible/ansible.cfg\n", |_, _, _| {
        Some(doc("Select data with JMESPath", Some("2.9")))
    });
    let loader = PluginLoader::new(
        fixture.paths(),
        Some(fixture.details()),
        ChangelogConfig::default(),
        runner.clone(),
    )
    .with_copy_strategy(CopyStrategy::Plain);

    let plugins = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].name, "json_query");
    assert_eq!(plugins[0].version_added.as_deref(), Some("2.9"));

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], vec!["--version"]);
    assert_eq!(&calls[1][..3], &["--json", "-t", "filter"]);
    assert_eq!(calls[1].last().map(String::as_str), Some("ns.coll.json_query"));
}

#[tokio::test]
async fn test_unparseable_version_output() {
    let fixture = CollectionFixture::new("ns", "coll").unwrap();
    let runner = FakeDocRunner::new(|_| Ok("usage: ansible-doc [-h] [--version]\n".to_string()));
    let loader = PluginLoader::new(
        fixture.paths(),
        Some(fixture.details()),
        ChangelogConfig::default(),
        runner.clone(),
    );

    let err = loader.load_plugins("1.0.0", &LoadOptions::default()).await.unwrap_err();
    match err.downcast_ref::<PlugmetaError>() {
        Some(PlugmetaError::ToolVersionUnparseable {
            output,
        }) => assert!(output.starts_with("usage: ansible-doc")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(runner.call_count(), 1);
    assert!(!loader.cache_path().exists());
}
