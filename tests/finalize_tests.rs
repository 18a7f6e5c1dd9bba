//! Finalize Pipeline Tests
//!
//! Runs the post-compile and post-write hooks of a constructed plan against
//! a build report and output directory on disk.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tempfile::TempDir;

use bundleplan::config::default_config;
use bundleplan::finalize::{self, BuildReport, FinalizeError, FinalizeTarget, Manifest};
use bundleplan::plan::{name_for, AssetKind, BuildPlan, PlanContext};
use bundleplan::profile::BuildProfile;

// ============================================================================
// Test Utilities
// ============================================================================

fn plan_in(root: &Path, profile: BuildProfile) -> BuildPlan {
    let ctx = PlanContext::new(default_config(), root.to_path_buf(), profile);
    BuildPlan::construct(&ctx).expect("plan should construct")
}

fn large_script() -> Vec<u8> {
    b"export function greet(name) { return 'hello ' + name; }\n"
        .iter()
        .copied()
        .cycle()
        .take(64 * 1024)
        .collect()
}

/// Write outputs the way the engine would and return the report path.
fn emit(plan: &BuildPlan, profile: BuildProfile) -> std::path::PathBuf {
    let out = &plan.output.path;
    fs::create_dir_all(out).expect("should create dir");

    let vendor = large_script();
    let main = b"import './app.scss';\n".to_vec();
    let css = b"body { margin: 0 }\n".to_vec();

    let vendor_name = name_for("vendor", AssetKind::Script, profile).expect("chunk name should be valid").render(&vendor);
    let main_name = name_for("main", AssetKind::Script, profile).expect("chunk name should be valid").render(&main);
    let css_name = name_for("main", AssetKind::Style, profile).expect("chunk name should be valid").render(&css);

    fs::write(out.join(&vendor_name), &vendor).expect("should write file");
    fs::write(out.join(&main_name), &main).expect("should write file");
    fs::write(out.join(&css_name), &css).expect("should write file");

    let report = serde_json::json!({
        "assets": [
            { "name": "vendor.js", "filename": vendor_name, "chunk": "vendor" },
            { "name": "main.js", "filename": main_name, "chunk": "main" },
            { "name": "main.css", "filename": css_name, "chunk": "main" }
        ],
        "children": [
            { "name": "extract-styles node_modules/css-loader/index.js!src/app.scss" }
        ]
    });
    let path = out.join("report.json");
    fs::write(&path, serde_json::to_vec_pretty(&report).expect("should serialize")).expect("should write file");
    path
}

fn finalize_plan(plan: &BuildPlan, report_path: &Path) -> finalize::FinalizeOutcome {
    let mut report = BuildReport::load(report_path).expect("report should load");
    report.read_contents(&plan.output.path).expect("should read contents");
    let target = FinalizeTarget::new(plan.output.path.clone());
    finalize::run(&plan.plugins, report, &target).expect("finalize should succeed")
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_production_finalize() {
    let temp = TempDir::new().expect("should create temp dir");
    let plan = plan_in(temp.path(), BuildProfile::Production);
    let report_path = emit(&plan, BuildProfile::Production);

    let outcome = finalize_plan(&plan, &report_path);
    assert!(outcome.report.children.is_empty());

    let manifest = Manifest::load(&plan.output.manifest).expect("manifest should load");
    assert_eq!(manifest.base_public_path, "/webpack/");
    assert_eq!(manifest.len(), 3);

    let vendor = manifest.get("vendor.js").expect("entry should exist");
    assert!(vendor.starts_with("vendor-") && vendor.ends_with(".js"));
    assert!(manifest.get("vendor.js.gz").is_none());

    let gz = fs::read(plan.output.path.join(format!("{}.gz", vendor))).expect("should read file");
    let mut unpacked = Vec::new();
    GzDecoder::new(gz.as_slice()).read_to_end(&mut unpacked).expect("should read stream");
    assert_eq!(unpacked, large_script());

    // Small outputs stay uncompressed
    let main = manifest.get("main.js").expect("entry should exist");
    assert!(!plan.output.path.join(format!("{}.gz", main)).exists());
}

#[test]
fn test_development_finalize() {
    let temp = TempDir::new().expect("should create temp dir");
    let plan = plan_in(temp.path(), BuildProfile::Development);
    let report_path = emit(&plan, BuildProfile::Development);

    let outcome = finalize_plan(&plan, &report_path);
    assert_eq!(outcome.written, 0);

    let manifest = Manifest::load(&plan.output.manifest).expect("manifest should load");
    assert_eq!(manifest.get("vendor.js"), Some("vendor.js"));
    assert_eq!(manifest.url_for("main.css").as_deref(), Some("http://localhost:3808/webpack/main.css"));
    assert!(!plan.output.path.join("vendor.js.gz").exists());
}

#[test]
fn test_finalize_twice_is_byte_identical() {
    let temp = TempDir::new().expect("should create temp dir");
    let plan = plan_in(temp.path(), BuildProfile::Production);
    let report_path = emit(&plan, BuildProfile::Production);

    finalize_plan(&plan, &report_path);
    let manifest = fs::read(&plan.output.manifest).expect("should read file");
    let vendor = Manifest::load(&plan.output.manifest).expect("manifest should load").get("vendor.js").expect("entry should exist").to_string();
    let gz_path = plan.output.path.join(format!("{}.gz", vendor));
    let gz = fs::read(&gz_path).expect("should read file");

    finalize_plan(&plan, &report_path);
    assert_eq!(fs::read(&plan.output.manifest).expect("should read file"), manifest);
    assert_eq!(fs::read(&gz_path).expect("should read file"), gz);
}

#[test]
fn test_missing_asset_is_reported() {
    let temp = TempDir::new().expect("should create temp dir");
    let plan = plan_in(temp.path(), BuildProfile::Production);
    let report_path = emit(&plan, BuildProfile::Production);

    let mut report = BuildReport::load(&report_path).expect("report should load");
    let first = report.assets[0].filename.clone();
    fs::remove_file(plan.output.path.join(&first)).expect("should remove file");

    let err = report.read_contents(&plan.output.path).unwrap_err();
    assert!(matches!(err, FinalizeError::MissingAsset { filename, .. } if filename == first));
}
