// ABOUTME: Step execution engine module for stepwise workflows
// ABOUTME: Handles decision evaluation, tick execution, the debug gate, and run results

pub mod config;
pub mod decision;
pub mod error;
pub mod executor;
pub mod gate;
pub mod result;

pub use config::EngineConfig;
pub use decision::evaluate;
pub use error::{ExecutionError, Result};
pub use executor::WorkflowEngine;
pub use gate::{AutoConfirm, ConsoleGate, DebugGate};
pub use result::{Outcome, RunResult, TickRecord};
