use std::path::Path;
use std::sync::Arc;

use itemdex_registry::{
    entries_from_str, CatalogContext, FilteringConfig, PackPlugin, PluginSet, SearchFilter,
};
use itemdex_testkit::{assert_json_snapshot, item, paths};

const BASE_PACK: &str = r#"
[
  { "id": "stone" },
  { "id": "dirt" },
  { "id": "water", "kind": "fluid" },
  { "id": "diamond_sword", "tag": { "damage": "0" } }
]
"#;

const ADDON_PACK: &str = r#"
[
  { "id": "create:cogwheel" },
  { "id": "create:shaft" }
]
"#;

const CONFIG: &str = r#"
hidden = [{ id = "dirt" }]
rules = [{ type = "manual" }]
"#;

fn build_context() -> CatalogContext {
    let mut plugins = PluginSet::new();
    plugins.register_entry_plugin(Arc::new(PackPlugin::new(
        "base",
        entries_from_str(BASE_PACK).expect("valid base pack"),
    )));
    // Registers before its anchor exists; the queue resolves it at distinct time.
    plugins.register_entry_plugin(Arc::new(
        PackPlugin::new("addon", entries_from_str(ADDON_PACK).expect("valid addon pack"))
            .with_anchor(item("stone"))
            .with_priority(-1),
    ));
    plugins.register_entry_plugin(Arc::new(PackPlugin::new("dupes", vec![item("dirt")])));

    let config: FilteringConfig = toml::from_str(CONFIG).expect("valid config");
    CatalogContext::new(plugins, config.build_pipeline().expect("valid rules"))
}

#[test]
fn packs_to_visible_catalog() {
    let context = build_context();
    let report = context.reload();

    assert_eq!(report.plugins_loaded, 3);
    assert!(report.failed_plugins.is_empty());
    assert_eq!(report.distinct.drained, 1);
    assert_eq!(report.distinct.raw_count, 7);
    assert_eq!(
        paths(&context.entries().canonical()),
        ["stone", "cogwheel", "shaft", "dirt", "water", "diamond_sword"]
    );

    let visible = context.entries().visible();
    let snapshot = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/snapshots/pipeline_visible.json");
    assert_json_snapshot(snapshot, &*visible).expect("visible list matches snapshot");
}

#[test]
fn search_over_visible_catalog() {
    let context = build_context();
    context.reload();
    let visible = context.entries().visible();

    let filter = SearchFilter::parse("@create -shaft | #damage").expect("valid query");
    let hits: Vec<_> = visible.iter().filter(|s| filter.matches(s)).cloned().collect();
    assert_eq!(paths(&hits), ["cogwheel", "diamond_sword"]);
}
