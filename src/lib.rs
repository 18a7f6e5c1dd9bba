//! Bundleplan - build plans for front-end asset pipelines
//!
//! This library provides functionality to:
//! - Resolve the build profile from an environment signal
//! - Assemble the rule table, chunking policy, output naming and plugin set
//!   for an external bundling engine
//! - Lay out a module graph into named chunks, rejecting conflicts up front
//! - Finalise a build: gzip outputs and publish the asset manifest atomically

pub mod cli;
pub mod config;
pub mod finalize;
pub mod fingerprint;
pub mod graph;
pub mod plan;
pub mod profile;
pub mod resolve;
