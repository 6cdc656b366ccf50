// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides graph builders, recording route tables, and temp-file environments

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::fs;

use stepwise::engine::{AutoConfirm, DebugGate, EngineConfig, WorkflowEngine};
use stepwise::parser::{WorkflowGraph, WorkflowResponse, WorkflowStep};
use stepwise::payload::{ActivityMessage, Payload};
use stepwise::routes::{RouteDefinition, RouteTable};

/// Builds workflow graphs step by step, in definition order.
pub struct TestGraphBuilder {
    steps: Vec<WorkflowStep>,
}

impl TestGraphBuilder {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// A step that branches to `targets` through the given decision routes, in order.
    pub fn add_branching_step(mut self, id: &str, route: &str, targets: &[(&str, &str)]) -> Self {
        let mut step = WorkflowStep::new(id, route);
        for (decision, target) in targets {
            step = step.with_response(WorkflowResponse::new(*decision, *target));
        }
        self.steps.push(step);
        self
    }

    pub fn add_input_step(mut self, id: &str, route: &str) -> Self {
        self.steps
            .push(WorkflowStep::new(id, route).with_user_input(true));
        self
    }

    pub fn build(self) -> WorkflowGraph {
        WorkflowGraph::new(self.steps)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.steps).expect("graph serializes")
    }

    pub async fn write_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        fs::write(path, self.to_json()).await?;
        Ok(())
    }
}

/// Shared log of handler invocations, in call order.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// Registers an action route that records `action:<key>:<step>` and stamps
/// the step id into the payload's `visited` list.
pub fn register_recording_action(table: &mut RouteTable, key: &str, log: &CallLog) {
    let log = log.clone();
    let tag = format!("action:{}", key);
    table.register(
        key,
        RouteDefinition::new(key).with_action(move |step: &WorkflowStep, payload: &mut Payload| {
            log.push(format!("{}:{}", tag, step.id));
            let mut visited = match payload.get("visited") {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            visited.push(json!(step.id));
            payload.insert("visited", visited);
        }),
    );
}

/// Registers a decision route with a fixed answer that records `decision:<key>`.
pub fn register_recording_decision(table: &mut RouteTable, key: &str, answer: bool, log: &CallLog) {
    let log = log.clone();
    let tag = format!("decision:{}", key);
    table.register(
        key,
        RouteDefinition::new(key).with_decision(move |_: &WorkflowResponse, _: &Payload| {
            log.push(tag.clone());
            answer
        }),
    );
}

pub fn engine_with(routes: RouteTable) -> WorkflowEngine {
    WorkflowEngine::new(Arc::new(routes), EngineConfig::default()).with_gate(Box::new(AutoConfirm))
}

pub fn payload(value: Value) -> Payload {
    Payload::from_value(value).expect("payload must be an object")
}

/// Debug gate that answers from a script and remembers what it was shown.
pub struct ScriptedGate {
    answers: Vec<bool>,
    pub shown: Arc<Mutex<Vec<ActivityMessage>>>,
}

impl ScriptedGate {
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers,
            shown: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl DebugGate for ScriptedGate {
    fn confirm(&mut self, message: &ActivityMessage) -> bool {
        self.shown.lock().unwrap().push(message.clone());
        if self.answers.is_empty() {
            true
        } else {
            self.answers.remove(0)
        }
    }
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub async fn create_graph_file(&self, name: &str, builder: &TestGraphBuilder) -> PathBuf {
        let graph_file = self.file(&format!("{}.json", name));
        builder
            .write_to_file(&graph_file)
            .await
            .expect("Failed to write graph file");
        graph_file
    }
}

pub async fn read_json_output(file_path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path).await?;
    let json: Value = serde_json::from_str(&content)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_builder() {
        let builder = TestGraphBuilder::new()
            .add_branching_step("s1", "r1", &[("d1", "s2")])
            .add_input_step("s2", "r1");

        let json = builder.to_json();
        assert!(json.contains("\"stepID\": \"s2\""));
        assert!(json.contains("\"userInput\": true"));
        assert_eq!(builder.build().step_ids(), vec!["s1", "s2"]);
    }
}
