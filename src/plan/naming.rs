//! Output naming strategy.
//!
//! Production filenames embed a content fingerprint so consumers can cache
//! them forever; development filenames are the bare chunk name so the dev
//! server's addresses stay stable between rebuilds.

use crate::fingerprint::fingerprint;
use crate::plan::PlanError;
use crate::profile::BuildProfile;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Placeholder the engine substitutes with the chunk's content hash.
pub const FINGERPRINT_TOKEN: &str = "[contenthash]";

/// Kind of output a template names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
}

impl AssetKind {
    /// File extension without the dot.
    pub fn ext(self) -> &'static str {
        match self {
            AssetKind::Script => "js",
            AssetKind::Style => "css",
        }
    }

    /// Infer the kind from a filename.
    pub fn from_filename(name: &str) -> Option<Self> {
        if name.ends_with(".js") {
            Some(AssetKind::Script)
        } else if name.ends_with(".css") {
            Some(AssetKind::Style)
        } else {
            None
        }
    }
}

/// A filename with an optional fingerprint slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilenameTemplate {
    chunk: String,
    kind: AssetKind,
    fingerprinted: bool,
}

impl FilenameTemplate {
    pub fn chunk(&self) -> &str {
        &self.chunk
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Whether the rendered name embeds a fingerprint.
    pub fn is_fingerprinted(&self) -> bool {
        self.fingerprinted
    }

    /// Render the final filename for the given chunk contents.
    pub fn render(&self, contents: &[u8]) -> String {
        if self.fingerprinted {
            format!("{}-{}.{}", self.chunk, fingerprint(contents), self.kind.ext())
        } else {
            format!("{}.{}", self.chunk, self.kind.ext())
        }
    }
}

impl std::fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fingerprinted {
            write!(f, "{}-{}.{}", self.chunk, FINGERPRINT_TOKEN, self.kind.ext())
        } else {
            write!(f, "{}.{}", self.chunk, self.kind.ext())
        }
    }
}

impl Serialize for FilenameTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Template for a chunk of the given kind under a profile.
pub fn name_for(
    chunk: &str,
    kind: AssetKind,
    profile: BuildProfile,
) -> Result<FilenameTemplate, PlanError> {
    if chunk.is_empty() {
        return Err(PlanError::EmptyChunkName);
    }
    Ok(FilenameTemplate { chunk: chunk.to_string(), kind, fingerprinted: profile.is_production() })
}

/// Generic pattern handed to the engine, e.g. `[name]-[contenthash].js`.
pub fn engine_pattern(kind: AssetKind, profile: BuildProfile) -> String {
    if profile.is_production() {
        format!("[name]-{}.{}", FINGERPRINT_TOKEN, kind.ext())
    } else {
        format!("[name].{}", kind.ext())
    }
}

/// Fail if two distinct owners map to the same filename.
///
/// `owners` yields `(owner label, filename)` pairs. The same owner may
/// appear more than once with the same filename. Any other unique key,
/// such as a logical asset name, works in place of the filename.
pub fn check_unique<'a, I>(owners: I) -> Result<(), PlanError>
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    let mut seen: HashMap<&str, String> = HashMap::new();
    for (owner, filename) in owners {
        match seen.get(filename) {
            Some(existing) if *existing != owner => {
                return Err(PlanError::NamingCollision {
                    filename: filename.to_string(),
                    first: existing.clone(),
                    second: owner,
                });
            }
            Some(_) => {}
            None => {
                seen.insert(filename, owner);
            }
        }
    }
    Ok(())
}
