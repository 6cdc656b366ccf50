// ABOUTME: Error types for workflow graph parsing and step resolution
// ABOUTME: Separates decode failures from lookups of steps that are not in the graph

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to read workflow file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse workflow JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Empty workflow: no steps defined")]
    EmptyWorkflow,

    #[error("Step not found: {step_id}")]
    StepNotFound { step_id: String },
}

impl ParserError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ParserError::StepNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
