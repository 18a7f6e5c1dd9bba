//! Chunking policy: partitions modules into named output groups.
//!
//! Groups are consulted in descending priority order and the first group
//! admitting a module claims it. A module no group claims rides with its
//! natural chunk: the entry that pulled it in, or the lazy chunk that
//! requested it.

use crate::graph::{ModuleGraph, ModuleRef};
use crate::plan::{Pattern, PlanError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Name of the built-in third-party group.
pub const VENDOR_GROUP: &str = "vendor";

/// Test of the built-in third-party group: script-like files below a
/// shared dependency directory.
pub const VENDOR_TEST: &str = r"(^|[\\/])node_modules[\\/].*js";

/// Which modules a group may claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainmentScope {
    /// Only modules in an entry's initial synchronous load
    #[default]
    Initial,
    /// Initial and lazily loaded modules
    All,
}

/// A named output group with a membership test.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkGroup {
    pub name: String,
    pub test: Pattern,
    pub priority: i32,
    #[serde(rename = "chunks")]
    pub scope: ContainmentScope,
}

impl ChunkGroup {
    /// Create a group, compiling its test.
    pub fn new(
        name: &str,
        test: &str,
        priority: i32,
        scope: ContainmentScope,
    ) -> Result<Self, PlanError> {
        if name.is_empty() {
            return Err(PlanError::EmptyChunkName);
        }
        Ok(Self { name: name.to_string(), test: Pattern::new(test)?, priority, scope })
    }

    /// The built-in vendor group.
    pub fn vendor() -> Result<Self, PlanError> {
        Self::new(VENDOR_GROUP, VENDOR_TEST, 1, ContainmentScope::Initial)
    }

    /// Whether this group may claim `module`.
    pub fn admits(&self, module: &ModuleRef) -> bool {
        let in_scope = match self.scope {
            ContainmentScope::Initial => module.load.is_initial(),
            ContainmentScope::All => true,
        };
        in_scope && self.test.is_match(&module.id)
    }
}

/// Where a chunk comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkOrigin {
    /// Claimed by a registered group
    Group,
    /// Default group of an entry point
    Entry,
    /// Default group of a lazy import
    Lazy,
}

/// Identity of a chunk within one build.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChunkId {
    pub origin: ChunkOrigin,
    pub name: String,
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let origin = match self.origin {
            ChunkOrigin::Group => "group",
            ChunkOrigin::Entry => "entry",
            ChunkOrigin::Lazy => "lazy",
        };
        write!(f, "{}:{}", origin, self.name)
    }
}

/// Where one module was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkAssignment {
    pub module: String,
    pub chunk: ChunkId,
}

/// Registered groups, ordered by descending priority.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ChunkingPolicy {
    groups: Vec<ChunkGroup>,
}

impl ChunkingPolicy {
    /// Build a policy from groups in registration order.
    pub fn new(mut groups: Vec<ChunkGroup>) -> Result<Self, PlanError> {
        groups.sort_by_key(|g| std::cmp::Reverse(g.priority));
        let policy = Self { groups };
        policy.validate()?;
        Ok(policy)
    }

    /// The built-in policy: only the vendor group.
    pub fn builtin() -> Result<Self, PlanError> {
        Self::new(vec![ChunkGroup::vendor()?])
    }

    /// Groups in evaluation order.
    pub fn groups(&self) -> &[ChunkGroup] {
        &self.groups
    }

    /// Reject configurations that are wrong regardless of the module set.
    ///
    /// Two groups may never share a priority: whether their tests overlap
    /// depends on the module set, and the engine would break such a tie by
    /// registration order.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut seen: HashMap<&str, &ChunkGroup> = HashMap::new();
        for group in &self.groups {
            if seen.insert(group.name.as_str(), group).is_some() {
                return Err(PlanError::DuplicateGroup(group.name.clone()));
            }
        }

        // Sorted by priority, so ties are adjacent
        for pair in self.groups.windows(2) {
            if pair[0].priority == pair[1].priority {
                let groups: Vec<String> = self
                    .groups
                    .iter()
                    .filter(|g| g.priority == pair[0].priority)
                    .map(|g| g.name.clone())
                    .collect();
                return Err(PlanError::PriorityConflict { priority: pair[0].priority, groups });
            }
        }
        Ok(())
    }

    /// Place one module.
    ///
    /// The highest-priority admitting group claims it; priorities are unique.
    pub fn classify(&self, module: &ModuleRef) -> ChunkAssignment {
        let chunk = match self.groups.iter().find(|g| g.admits(module)) {
            Some(group) => ChunkId { origin: ChunkOrigin::Group, name: group.name.clone() },
            None => {
                let origin =
                    if module.load.is_initial() { ChunkOrigin::Entry } else { ChunkOrigin::Lazy };
                ChunkId { origin, name: module.natural_chunk() }
            }
        };
        ChunkAssignment { module: module.id.clone(), chunk }
    }

    /// Classify every admitted module of a graph.
    ///
    /// `admit` filters modules out of the build entirely; rejected modules
    /// are listed in [`ChunkLayout::excluded`].
    pub fn layout<F>(&self, graph: &ModuleGraph, admit: F) -> ChunkLayout
    where
        F: Fn(&str) -> bool,
    {
        let mut chunks: BTreeMap<ChunkId, Vec<String>> = BTreeMap::new();
        let mut assignments = Vec::with_capacity(graph.modules.len());
        let mut excluded = Vec::new();

        for entry in &graph.entries {
            chunks.entry(ChunkId { origin: ChunkOrigin::Entry, name: entry.clone() }).or_default();
        }

        for module in &graph.modules {
            if !admit(&module.id) {
                tracing::debug!(module = %module.id, "module excluded from build");
                excluded.push(module.id.clone());
                continue;
            }
            let assignment = self.classify(module);
            tracing::debug!(module = %module.id, chunk = %assignment.chunk, "classified module");
            chunks.entry(assignment.chunk.clone()).or_default().push(module.id.clone());
            assignments.push(assignment);
        }

        let chunks = chunks.into_iter().map(|(id, modules)| Chunk { id, modules }).collect();
        ChunkLayout { chunks, assignments, excluded }
    }
}

/// A chunk and the modules placed in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub modules: Vec<String>,
}

/// Result of classifying a module graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChunkLayout {
    /// Chunks ordered by origin, then name
    pub chunks: Vec<Chunk>,
    /// Per-module placement in graph order
    pub assignments: Vec<ChunkAssignment>,
    /// Modules dropped by the admission filter
    pub excluded: Vec<String>,
}

impl ChunkLayout {
    /// Chunk a module was placed in.
    pub fn chunk_of(&self, module: &str) -> Option<&ChunkId> {
        self.assignments.iter().find(|a| a.module == module).map(|a| &a.chunk)
    }

    /// Find a chunk by name.
    pub fn chunk(&self, name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.id.name == name)
    }
}
