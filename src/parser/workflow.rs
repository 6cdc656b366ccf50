// ABOUTME: Ordered step catalog parsed from a workflow graph definition
// ABOUTME: Resolves steps by id, with an empty id selecting the entry step

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use super::error::{ParserError, Result};
use super::step::WorkflowStep;

/// The steps of one workflow, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowGraph {
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowGraph {
    pub fn new(steps: Vec<WorkflowStep>) -> Self {
        Self { steps }
    }

    /// Parse a graph from its JSON form: an array of step objects.
    pub fn parse(content: &str) -> Result<Self> {
        let steps: Vec<WorkflowStep> = serde_json::from_str(content)?;
        Ok(Self { steps })
    }

    /// Parse a graph from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Find the step to run. An empty id selects the first step in the graph.
    pub fn resolve(&self, step_id: &str) -> Result<&WorkflowStep> {
        if step_id.is_empty() {
            return self.steps.first().ok_or(ParserError::EmptyWorkflow);
        }

        self.steps
            .iter()
            .find(|step| step.id == step_id)
            .ok_or_else(|| ParserError::StepNotFound {
                step_id: step_id.to_string(),
            })
    }

    /// Get all step IDs in definition order
    pub fn step_ids(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.id.clone()).collect()
    }

    /// Check if a step exists in the graph
    pub fn has_step(&self, step_id: &str) -> bool {
        !step_id.is_empty() && self.steps.iter().any(|step| step.id == step_id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Convert the graph back to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ParserError::JsonError)
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowParser;

impl WorkflowParser {
    pub fn new() -> Self {
        Self
    }

    pub async fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<WorkflowGraph> {
        let content = fs::read_to_string(path.as_ref())
            .await
            .map_err(ParserError::IoError)?;
        self.parse_string(&content)
    }

    pub fn parse_string(&self, content: &str) -> Result<WorkflowGraph> {
        WorkflowGraph::parse(content)
    }
}

impl Default for WorkflowParser {
    fn default() -> Self {
        Self::new()
    }
}
