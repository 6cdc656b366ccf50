// ABOUTME: Main library module for the stepwise workflow step engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod parser;
pub mod payload;
pub mod routes;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{EngineConfig, ExecutionError, Outcome, RunResult, WorkflowEngine};
pub use parser::{WorkflowGraph, WorkflowParser, WorkflowResponse, WorkflowStep};
pub use payload::{Activity, ActivityMessage, Payload};
pub use routes::{Action, Decision, RouteDefinition, RouteTable};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
