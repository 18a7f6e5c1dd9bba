//! Ordered execution of post-compile and post-write plugins.

use crate::finalize::compress::compress_report;
use crate::finalize::report::BuildReport;
use crate::finalize::{FinalizeError, Manifest};
use crate::plan::{check_unique, LifecyclePhase, Plugin};
use std::path::{Path, PathBuf};

/// Where finalisation writes.
#[derive(Debug, Clone)]
pub struct FinalizeTarget {
    pub out_dir: PathBuf,
}

impl FinalizeTarget {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

/// Summary of one finalisation run.
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    pub report: BuildReport,
    /// Assets written by post-compile plugins
    pub written: usize,
    /// Ids of the hooks that ran, in order
    pub hooks: Vec<&'static str>,
}

impl FinalizeOutcome {
    pub fn manifest(&self) -> Option<&Manifest> {
        self.report.manifest.as_ref()
    }
}

/// Apply one plugin's hook to the report.
///
/// Compile-phase plugins act inside the engine; they pass the report through.
pub fn apply_hook(
    plugin: &Plugin,
    mut report: BuildReport,
    target: &FinalizeTarget,
) -> Result<BuildReport, FinalizeError> {
    match plugin {
        Plugin::Compression(settings) => compress_report(settings, report),
        Plugin::StripExtractChildren { prefix } => {
            let before = report.children.len();
            report.children.retain(|child| !child.name.starts_with(prefix.as_str()));
            tracing::debug!(removed = before - report.children.len(), "stripped extract children");
            Ok(report)
        }
        Plugin::Manifest { public_path, file_name, write_to_disk } => {
            let manifest = Manifest::publish(report.primary_mapping(), public_path);
            if *write_to_disk {
                manifest.write(&target.out_dir.join(file_name))?;
            }
            report.manifest = Some(manifest);
            Ok(report)
        }
        _ => Ok(report),
    }
}

/// Run every post-compile hook, write new assets, then run post-write hooks.
///
/// Within a phase hooks run in plugin-list order.
pub fn run(
    plugins: &[Plugin],
    report: BuildReport,
    target: &FinalizeTarget,
) -> Result<FinalizeOutcome, FinalizeError> {
    check_unique(
        report.assets.iter().map(|a| (a.name.clone(), a.filename.as_str())),
    )?;
    // Manifest entries are keyed by logical name
    check_unique(report.primary_mapping().map(|(name, filename)| (filename.to_string(), name)))?;

    let mut hooks = Vec::new();
    let mut report = run_phase(plugins, LifecyclePhase::PostCompile, report, target, &mut hooks)?;
    let written = report.write_pending(&target.out_dir)?;
    let report = run_phase(plugins, LifecyclePhase::PostWrite, report, target, &mut hooks)?;

    tracing::info!(written, hooks = hooks.len(), "finalize complete");
    Ok(FinalizeOutcome { report, written, hooks })
}

fn run_phase(
    plugins: &[Plugin],
    phase: LifecyclePhase,
    mut report: BuildReport,
    target: &FinalizeTarget,
    hooks: &mut Vec<&'static str>,
) -> Result<BuildReport, FinalizeError> {
    for plugin in plugins.iter().filter(|p| p.phase() == phase) {
        tracing::debug!(plugin = plugin.id(), ?phase, "running hook");
        report = apply_hook(plugin, report, target)?;
        hooks.push(plugin.id());
    }
    Ok(report)
}
