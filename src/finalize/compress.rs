//! Gzip post-processing of script and style outputs.
//!
//! An asset gets a co-located `.gz` artifact when its filename passes the
//! test, it is larger than the threshold, and the compressed size divided
//! by the original stays below the minimum ratio. The original is kept.
//! Output is byte-for-byte reproducible: the gzip header carries no
//! timestamp or filename.

use crate::finalize::report::{BuildReport, EmittedAsset};
use crate::finalize::FinalizeError;
use crate::plan::CompressionSettings;
use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};
use rayon::prelude::*;
use std::io::Write;

/// Suffix of compressed artifacts.
pub const GZIP_SUFFIX: &str = ".gz";

/// Why an asset was or was not compressed.
#[derive(Debug, Clone, PartialEq)]
pub enum CompressionOutcome {
    /// Artifact produced
    Compressed { bytes: Vec<u8>, ratio: f64 },
    /// Filename does not pass the test
    NotEligible,
    /// Not larger than the threshold
    BelowThreshold,
    /// Compressed too poorly to be worth serving
    PoorRatio(f64),
}

/// Gzip `data` with a fixed header.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder: GzEncoder<Vec<u8>> =
        GzBuilder::new().mtime(0).write(Vec::with_capacity(data.len() / 2), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decide and, if worthwhile, compress one asset.
pub fn compress_asset(
    settings: &CompressionSettings,
    filename: &str,
    contents: &[u8],
) -> std::io::Result<CompressionOutcome> {
    if !settings.test.is_match(filename) {
        return Ok(CompressionOutcome::NotEligible);
    }
    if contents.len() as u64 <= settings.threshold {
        return Ok(CompressionOutcome::BelowThreshold);
    }

    let bytes = gzip(contents)?;
    let ratio = bytes.len() as f64 / contents.len() as f64;
    if ratio < settings.min_ratio {
        Ok(CompressionOutcome::Compressed { bytes, ratio })
    } else {
        Ok(CompressionOutcome::PoorRatio(ratio))
    }
}

/// Add compressed artifacts for every qualifying primary asset.
///
/// Existing artifacts with the same filename are replaced, so running the
/// step twice leaves the report unchanged.
pub fn compress_report(
    settings: &CompressionSettings,
    mut report: BuildReport,
) -> Result<BuildReport, FinalizeError> {
    let artifacts: Vec<EmittedAsset> = report
        .assets
        .par_iter()
        .filter(|a| !a.auxiliary)
        .map(|asset| {
            let outcome = compress_asset(settings, &asset.filename, &asset.contents)?;
            Ok(match outcome {
                CompressionOutcome::Compressed { bytes, ratio } => {
                    tracing::debug!(asset = %asset.filename, ratio, "compressed asset");
                    Some(EmittedAsset::colocated(asset, GZIP_SUFFIX, bytes))
                }
                CompressionOutcome::PoorRatio(ratio) => {
                    tracing::debug!(asset = %asset.filename, ratio, "compression ratio too poor");
                    None
                }
                _ => None,
            })
        })
        .collect::<Result<Vec<Option<EmittedAsset>>, std::io::Error>>()?
        .into_iter()
        .flatten()
        .collect();

    tracing::info!(artifacts = artifacts.len(), "compression finished");
    for artifact in artifacts {
        report.upsert(artifact);
    }
    Ok(report)
}
