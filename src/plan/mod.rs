//! Build plan module for bundleplan
//!
//! Turns a resolved [`BuildProfile`](crate::profile::BuildProfile) into a
//! complete plan for the external bundling engine.
//!
//! # Overview
//!
//! The plan consists of:
//! - **Rules**: which transform chain applies to which input
//! - **Chunking**: which output group each module lands in
//! - **Naming**: how each output file is named
//! - **Plugins**: which lifecycle hooks are active, in order
//!
//! # Example
//!
//! ```ignore
//! use bundleplan::config::load_config;
//! use bundleplan::plan::{BuildPlan, PlanContext};
//!
//! let config = load_config(None)?;
//! let ctx = PlanContext::new(config, project_root, bundleplan::profile::from_env());
//! let plan = BuildPlan::construct(&ctx)?;
//! let outline = plan.outline(&graph)?;
//! ```

pub mod build_plan;
pub mod chunk;
pub mod context;
pub mod error;
pub mod naming;
pub mod pattern;
pub mod plugins;
pub mod rules;

pub use build_plan::*;
pub use chunk::*;
pub use context::*;
pub use error::*;
pub use naming::*;
pub use pattern::*;
pub use plugins::*;
pub use rules::*;
