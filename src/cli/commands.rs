// ABOUTME: Command implementations for the stepwise CLI
// ABOUTME: Handles execution of run, steps, and routes commands

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::config::Config;
use crate::engine::{ExecutionError, Outcome, RunResult, WorkflowEngine};
use crate::parser::{WorkflowGraph, WorkflowParser, WorkflowStep};
use crate::payload::{Activity, Payload};
use crate::routes::{RouteSummary, RouteTable};

/// Inputs for a single `run` invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub workflow: PathBuf,
    pub payload: Option<PathBuf>,
    pub step: String,
    pub variables: HashMap<String, String>,
    pub thread: Option<PathBuf>,
    pub activity: Option<String>,
    pub debug: bool,
    pub output: Option<PathBuf>,
}

/// Execute a workflow command
pub async fn run_workflow(options: RunOptions, config: &Config) -> Result<()> {
    info!("Starting workflow execution: {}", options.workflow.display());

    let graph = WorkflowParser::new()
        .parse_file(&options.workflow)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse workflow: {}", e))?;
    info!("Loaded workflow with {} steps", graph.len());

    let raw_payload = match &options.payload {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read payload file '{}'", path.display()))?,
        None => String::new(),
    };
    let payload = build_payload(&raw_payload, &options.variables, options.debug)?;

    let mut activity = Activity::new(
        options
            .activity
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );
    if let Some(path) = options.thread.as_ref().filter(|path| path.exists()) {
        let loaded = activity
            .load_thread_file(path)
            .with_context(|| format!("Failed to load thread '{}'", path.display()))?;
        info!("Loaded {} thread entries", loaded);
    }

    let routes = Arc::new(RouteTable::with_builtins());
    let mut engine = WorkflowEngine::new(routes, config.engine.clone());
    let thread_path = options.thread.clone();
    let step = options.step.clone();

    // The debug gate blocks on stdin, so the engine runs off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        engine.execute(&graph, payload, &step, &mut activity, |message| {
            println!(
                "Committed {} (step: {}, to: {:?})",
                message.id,
                message.envelope.workflow_id(),
                message.envelope.to()
            );
            if let Some(path) = &thread_path {
                if let Err(e) = Activity::append_to_file(path, message) {
                    warn!("Failed to append to thread '{}': {}", path.display(), e);
                }
            }
        })
    })
    .await?;

    let run = match result {
        Ok(run) => run,
        Err(e) => return Err(report_failure(e)),
    };

    if let Some(output_path) = &options.output {
        let json_content = serde_json::to_string_pretty(&run)
            .map_err(|e| anyhow::anyhow!("Failed to serialize results to JSON: {}", e))?;

        tokio::fs::write(output_path, json_content)
            .await
            .with_context(|| format!("Failed to write output file '{}'", output_path.display()))?;

        info!("Results written to: {}", output_path.display());
    } else {
        print!("{}", render_run(&run)?);
    }

    info!("Workflow execution completed");
    Ok(())
}

/// List the steps of a workflow graph
pub async fn list_steps(workflow_path: PathBuf) -> Result<()> {
    let graph = WorkflowParser::new()
        .parse_file(&workflow_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse workflow: {}", e))?;

    print!("{}", render_steps(&graph));
    Ok(())
}

/// List the registered routes
pub fn list_routes(json: bool) -> Result<()> {
    let summaries = RouteTable::with_builtins().describe();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print!("{}", render_routes(&summaries));
    }
    Ok(())
}

/// Decode the incoming payload and apply `--set` overrides and the debug flag.
fn build_payload(raw: &str, variables: &HashMap<String, String>, debug: bool) -> Result<Payload> {
    let mut payload =
        Payload::from_json(raw).map_err(|e| anyhow::anyhow!("Invalid payload: {}", e))?;

    let mut keys: Vec<&String> = variables.keys().collect();
    keys.sort();
    for key in keys {
        payload.insert(key.clone(), variables[key].clone());
    }

    if debug {
        payload.set_debug(true);
    }
    Ok(payload)
}

fn report_failure(error: ExecutionError) -> anyhow::Error {
    if let Some(payload) = error.payload() {
        match payload.to_json_pretty() {
            Ok(json) => eprintln!("Payload at failure:\n{}", json),
            Err(e) => warn!("Could not render payload at failure: {}", e),
        }
    }
    anyhow::anyhow!("Workflow execution failed: {}", error)
}

fn render_run(run: &RunResult) -> Result<String> {
    let mut out = format!(
        "Run {}: {} ({:?})\n",
        run.run_id,
        run.outcome,
        run.duration()
    );
    for tick in &run.ticks {
        out.push_str(&format!("  Step '{}' via {}", tick.step_id, tick.route));
        if let Some(chosen) = &tick.chosen_route {
            out.push_str(&format!(" -> {}", chosen));
        }
        out.push('\n');
    }

    if let Outcome::AwaitingInput { step } = &run.outcome {
        if !step.route.is_empty() {
            out.push_str(&format!("Waiting on route {}\n", step.route));
        }
    }
    out.push_str(&run.outcome.payload().to_json_pretty()?);
    out.push('\n');
    Ok(out)
}

fn render_steps(graph: &WorkflowGraph) -> String {
    graph.steps.iter().map(render_step).collect()
}

fn render_step(step: &WorkflowStep) -> String {
    let mut line = format!("{} [{}]", step.id, step.route);
    if step.user_input {
        line.push_str(" (user input)");
    }
    for response in &step.responses {
        line.push_str(&format!("\n  {} -> {}", response.route, response.step_id));
    }
    line.push('\n');
    line
}

fn render_routes(summaries: &[RouteSummary]) -> String {
    summaries
        .iter()
        .map(|summary| {
            let definition = &summary.definition;
            let mut line = format!("{:<24} {}", summary.key, definition.name);
            if definition.has_action() {
                line.push_str(" [action]");
            }
            if definition.has_decision() {
                line.push_str(" [decision]");
            }
            line.push('\n');
            line
        })
        .collect()
}
