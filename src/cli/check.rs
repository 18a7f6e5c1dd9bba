//! Check command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::plan::{BuildPlan, PlanContext, RuleTable};
use crate::profile::BuildProfile;

use super::{load_context, ProjectArgs, EXIT_ERROR, EXIT_SUCCESS};

/// Find all files under a source directory (recursively).
pub fn find_source_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/**/*", dir.display());
    match glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(_) => Vec::new(),
    }
}

/// Source files no rule claims, relative to `src`.
fn unclaimed(rules: &RuleTable, src: &Path) -> Vec<String> {
    find_source_files(src)
        .iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(src).unwrap_or(path).to_string_lossy().replace('\\', "/");
            // Plain scripts need no transform
            let is_script = relative.ends_with(".js");
            (!is_script && rules.rule_for(&relative).is_none()).then_some(relative)
        })
        .collect()
}

/// Execute the check command
///
/// Plans are constructed for both profiles so that errors specific to either
/// one surface regardless of the current environment.
pub fn run_check(args: &ProjectArgs, strict: bool) -> ExitCode {
    let ctx = match load_context(args) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let mut failed = false;
    for profile in [BuildProfile::Development, BuildProfile::Production] {
        let profile_ctx = PlanContext::new(ctx.config().clone(), ctx.project_root().to_path_buf(), profile);
        match BuildPlan::construct(&profile_ctx) {
            Ok(plan) => println!(
                "{}: ok ({} rules, {} chunk groups, {} plugins)",
                profile,
                plan.rules.len(),
                plan.split_chunks.groups().len(),
                plan.plugins.len()
            ),
            Err(e) => {
                eprintln!("{}: {}", profile, e);
                failed = true;
            }
        }
    }

    let src = ctx.src_dir();
    if src.is_dir() {
        if let Ok(plan) = BuildPlan::construct(&ctx) {
            let missing = unclaimed(&plan.rules, &src);
            for file in &missing {
                tracing::warn!(file = %file, "no rule matches source file");
                println!("warning: no rule for {}", file);
            }
            if strict && !missing.is_empty() {
                failed = true;
            }
        }
    } else {
        println!("warning: source directory {} does not exist", src.display());
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
