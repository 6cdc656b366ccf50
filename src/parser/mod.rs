// ABOUTME: Parser module for JSON workflow graph definitions
// ABOUTME: Exports the step catalog, step structures, and parsing errors

pub mod error;
pub mod step;
pub mod workflow;

pub use error::{ParserError, Result};
pub use step::{Location, WorkflowResponse, WorkflowStep};
pub use workflow::{WorkflowGraph, WorkflowParser};
