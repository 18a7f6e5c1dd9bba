//! Plan command implementations (plan, chunks)

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use crate::graph::ModuleGraph;
use crate::plan::{BuildPlan, ChunkOutline};

use super::{load_context, ProjectArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Serialize)]
struct PlanOutput<'a> {
    plan: &'a BuildPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    outline: Option<ChunkOutline>,
}

fn load_graph(path: &Path) -> Result<ModuleGraph, ExitCode> {
    ModuleGraph::load(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

fn construct(args: &ProjectArgs) -> Result<BuildPlan, ExitCode> {
    let ctx = load_context(args)?;
    BuildPlan::construct(&ctx).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Execute the plan command
pub fn run_plan(args: &ProjectArgs, graph: Option<&Path>, pretty: bool) -> ExitCode {
    let plan = match construct(args) {
        Ok(plan) => plan,
        Err(code) => return code,
    };

    let outline = match graph {
        Some(path) => {
            let graph = match load_graph(path) {
                Ok(g) => g,
                Err(code) => return code,
            };
            match plan.outline(&graph) {
                Ok(outline) => Some(outline),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_ERROR);
                }
            }
        }
        None => None,
    };

    let output = PlanOutput { plan: &plan, outline };
    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    match json {
        Ok(text) => {
            println!("{}", text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error serializing plan: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the chunks command
pub fn run_chunks(args: &ProjectArgs, graph: &Path, format: &str) -> ExitCode {
    if format != "text" && format != "json" {
        eprintln!("Error: --format must be 'text' or 'json'");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let plan = match construct(args) {
        Ok(plan) => plan,
        Err(code) => return code,
    };
    let graph = match load_graph(graph) {
        Ok(g) => g,
        Err(code) => return code,
    };
    let outline = match plan.outline(&graph) {
        Ok(outline) => outline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if format == "json" {
        match serde_json::to_string_pretty(&outline) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing chunks: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    // Outputs are produced in layout order
    for (chunk, output) in outline.layout.chunks.iter().zip(&outline.outputs) {
        print!("{} -> {}", chunk.id, output.script);
        if let Some(style) = &output.style {
            print!(", {}", style);
        }
        println!();
        for module in &chunk.modules {
            println!("    {}", module);
        }
    }
    if !outline.layout.excluded.is_empty() {
        println!("excluded:");
        for module in &outline.layout.excluded {
            println!("    {}", module);
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
