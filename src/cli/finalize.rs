//! Finalize command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::finalize::{self, BuildReport, FinalizeTarget};
use crate::plan::BuildPlan;

use super::{load_context, ProjectArgs, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the finalize command
pub fn run_finalize(args: &ProjectArgs, report_path: &Path) -> ExitCode {
    let ctx = match load_context(args) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let plan = match BuildPlan::construct(&ctx) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let out_dir = plan.output.path.clone();
    let mut report = match BuildReport::load(report_path) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error reading build report {}: {}", report_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if let Err(e) = report.read_contents(&out_dir) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    let target = FinalizeTarget::new(out_dir);
    match finalize::run(&plan.plugins, report, &target) {
        Ok(outcome) => {
            println!("Finalized {} assets ({} written)", outcome.report.assets.len(), outcome.written);
            if let Some(manifest) = outcome.manifest() {
                println!("Manifest: {} entries at {}", manifest.len(), plan.output.manifest.display());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Finalize error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
