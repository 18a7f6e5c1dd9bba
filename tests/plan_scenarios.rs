//! Plan Scenario Tests
//!
//! End-to-end plan construction for both profiles, driven through the
//! public API the way the CLI uses it:
//!
//! - Development: readable names, dev-server public path, lazy fall-through
//! - Production: fingerprinted names, frozen environment marker, compression
//! - Conflicts: equal-priority groups and colliding filenames fail up front

use std::path::PathBuf;

use bundleplan::config::{default_config, BundleConfig, GroupConfig};
use bundleplan::fingerprint::is_fingerprint;
use bundleplan::graph::{ModuleGraph, ModuleRef};
use bundleplan::plan::{
    BuildPlan, ChunkOrigin, ContainmentScope, PlanContext, PlanError, Plugin, ENV_MARKER,
};
use bundleplan::profile::{self, BuildProfile};

// ============================================================================
// Test Utilities
// ============================================================================

fn app_config() -> BundleConfig {
    let mut config = default_config();
    config.project.entry = "app.js".to_string();
    config.project.entry_name = "app".to_string();
    config
}

fn plan_for(config: BundleConfig, profile: BuildProfile) -> BuildPlan {
    let ctx = PlanContext::new(config, PathBuf::from("/project"), profile);
    BuildPlan::construct(&ctx).expect("plan should construct")
}

/// One entry with its own module, a library in the initial load and a
/// lazily imported date library.
fn app_graph() -> ModuleGraph {
    ModuleGraph::new()
        .with_entry("app")
        .with_module(ModuleRef::initial("src/app.js", "app"))
        .with_module(ModuleRef::initial("node_modules/lodash/lodash.js", "app"))
        .with_module(ModuleRef::lazy("node_modules/moment/moment.js", "app", None))
}

// ============================================================================
// Development
// ============================================================================

#[test]
fn test_development_outputs() {
    let plan = plan_for(app_config(), profile::resolve(None));
    assert_eq!(plan.mode, BuildProfile::Development);

    let outline = plan.outline(&app_graph()).expect("outline should succeed");
    let names: Vec<String> = outline.outputs.iter().map(|o| o.script.to_string()).collect();
    assert!(names.contains(&"vendor.js".to_string()));
    assert!(names.contains(&"app.js".to_string()));
    assert!(names.contains(&"moment.js".to_string()));
    assert!(names.iter().all(|n| !n.contains("[contenthash]")));

    let layout = &outline.layout;
    assert_eq!(layout.chunk_of("node_modules/lodash/lodash.js").expect("module should be placed").name, "vendor");
    assert_eq!(layout.chunk_of("src/app.js").expect("module should be placed").name, "app");
    let moment = layout.chunk_of("node_modules/moment/moment.js").expect("module should be placed");
    assert_eq!(moment.origin, ChunkOrigin::Lazy);
    assert_eq!(moment.name, "moment");
}

#[test]
fn test_development_public_path_and_dev_server() {
    let plan = plan_for(app_config(), BuildProfile::Development);
    assert!(plan.output.public_path.starts_with("http://"));
    assert_eq!(plan.output.public_path, "http://localhost:3808/webpack/");

    let server = plan.dev_server.as_ref().expect("value should be present");
    assert_eq!(server.port, 3808);
    assert_eq!(server.cors_header, "*");
    assert!(server.disable_host_check);
    assert_eq!(plan.devtool.as_deref(), Some("source-map"));
    assert!(!plan.minimize);
    assert!(plan.plugin("named-modules").is_some());
    assert!(plan.plugin("compression").is_none());
}

#[test]
fn test_lazy_vendor_module_is_not_claimed() {
    let plan = plan_for(app_config(), BuildProfile::Development);
    let graph = ModuleGraph::new()
        .with_entry("app")
        .with_module(ModuleRef::lazy("node_modules/chart.js/dist/chart.js", "app", Some("charts")));

    let layout = plan.layout(&graph);
    let chunk = layout.chunk_of("node_modules/chart.js/dist/chart.js").expect("module should be placed");
    assert_eq!(chunk.origin, ChunkOrigin::Lazy);
    assert_eq!(chunk.name, "charts");
    assert!(layout.chunk("vendor").is_none());
}

#[test]
fn test_locale_variants_filtered() {
    let plan = plan_for(app_config(), BuildProfile::Development);
    let graph = app_graph()
        .with_module(ModuleRef::initial("node_modules/moment/locale/ru.js", "app"))
        .with_module(ModuleRef::initial("node_modules/moment/locale/de.js", "app"));

    let layout = plan.layout(&graph);
    assert_eq!(layout.chunk_of("node_modules/moment/locale/ru.js").expect("module should be placed").name, "vendor");
    assert!(layout.chunk_of("node_modules/moment/locale/de.js").is_none());
    assert_eq!(layout.excluded, vec!["node_modules/moment/locale/de.js".to_string()]);
}

// ============================================================================
// Production
// ============================================================================

#[test]
fn test_production_outputs_are_fingerprinted() {
    let plan = plan_for(app_config(), profile::resolve(Some("production")));
    assert_eq!(plan.mode, BuildProfile::Production);
    assert_eq!(plan.output.public_path, "/webpack/");
    assert_eq!(plan.output.filename, "[name]-[contenthash].js");
    assert!(plan.minimize);
    assert!(plan.dev_server.is_none());
    assert!(plan.devtool.is_none());

    let outline = plan.outline(&app_graph()).expect("outline should succeed");
    let vendor = outline.output("vendor").expect("output should exist");
    let rendered = vendor.script.render(b"var _ = {};");
    let (stem, ext) = rendered.rsplit_once('.').expect("separator should be present");
    let (chunk, hash) = stem.split_once('-').expect("separator should be present");
    assert_eq!(chunk, "vendor");
    assert_eq!(ext, "js");
    assert!(is_fingerprint(hash));
}

#[test]
fn test_production_define_and_compression() {
    let plan = plan_for(app_config(), BuildProfile::Production);

    let Some(Plugin::Define { definitions }) = plan.plugin("define") else {
        panic!("define plugin missing");
    };
    assert_eq!(definitions.get(ENV_MARKER).map(String::as_str), Some("\"production\""));

    let Some(Plugin::Compression(settings)) = plan.plugin("compression") else {
        panic!("compression plugin missing");
    };
    assert_eq!(settings.threshold, 4096);
    assert!(settings.test.is_match("app-0123456789abcdef0123.js"));
}

#[test]
fn test_mixed_case_signal_is_development() {
    let plan = plan_for(app_config(), profile::resolve(Some("Production")));
    assert_eq!(plan.mode, BuildProfile::Development);
    assert!(plan.plugin("define").is_none());
}

#[test]
fn test_construction_is_repeatable() {
    let first = serde_json::to_value(plan_for(app_config(), BuildProfile::Production)).expect("should serialize");
    let second = serde_json::to_value(plan_for(app_config(), BuildProfile::Production)).expect("should serialize");
    assert_eq!(first, second);
}

// ============================================================================
// Conflicts
// ============================================================================

#[test]
fn test_equal_priority_groups_fail_construction() {
    let mut config = app_config();
    config.chunks.groups.push(GroupConfig {
        name: "libs".to_string(),
        test: r"node_modules[\\/]lodash".to_string(),
        priority: 1,
        scope: ContainmentScope::Initial,
    });
    let ctx = PlanContext::new(config, PathBuf::from("/srv/app"), BuildProfile::Production);

    let err = BuildPlan::construct(&ctx).unwrap_err();
    match err {
        PlanError::PriorityConflict { priority, groups } => {
            assert_eq!(priority, 1);
            assert_eq!(groups, vec!["vendor".to_string(), "libs".to_string()]);
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn test_higher_priority_group_wins() {
    let mut config = app_config();
    config.chunks.groups.push(GroupConfig {
        name: "libs".to_string(),
        test: r"node_modules[\\/]lodash".to_string(),
        priority: 10,
        scope: ContainmentScope::Initial,
    });
    let plan = plan_for(config, BuildProfile::Development);

    let layout = plan.layout(&app_graph());
    assert_eq!(layout.chunk_of("node_modules/lodash/lodash.js").expect("module should be placed").name, "libs");
}

#[test]
fn test_group_named_after_entry_collides() {
    let mut config = app_config();
    config.chunks.groups.push(GroupConfig {
        name: "app".to_string(),
        test: r"^src[\\/]shared".to_string(),
        priority: 5,
        scope: ContainmentScope::All,
    });
    let plan = plan_for(config, BuildProfile::Development);
    let graph = app_graph().with_module(ModuleRef::initial("src/shared/util.js", "app"));

    let err = plan.outline(&graph).unwrap_err();
    assert!(matches!(err, PlanError::NamingCollision { ref filename, .. } if filename == "app.js"));
}
