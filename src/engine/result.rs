// ABOUTME: Execution outcome types for a single engine run
// ABOUTME: Records each tick and where the run stopped: awaiting input, quiescent, or aborted

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::parser::WorkflowStep;
use crate::payload::Payload;

/// Where a run stopped without error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// A human has to act next. Either the step asked for input, or its route
    /// was unregistered and a bypass step was synthesized. The step's
    /// `payload` holds the finalized payload.
    AwaitingInput { step: WorkflowStep },

    /// No response was accepted, or the step had none to evaluate.
    Quiescent { step_id: String, payload: Payload },

    /// The debug gate declined; nothing was committed for this tick.
    DebugAborted { step_id: String, payload: Payload },
}

impl Outcome {
    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, Outcome::AwaitingInput { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::DebugAborted { .. })
    }

    /// The step the run stopped on.
    pub fn step_id(&self) -> &str {
        match self {
            Outcome::AwaitingInput { step } => &step.id,
            Outcome::Quiescent { step_id, .. } | Outcome::DebugAborted { step_id, .. } => step_id,
        }
    }

    /// The payload as it stood when the run stopped.
    pub fn payload(&self) -> Payload {
        match self {
            Outcome::AwaitingInput { step } => step.payload_object().unwrap_or_default(),
            Outcome::Quiescent { payload, .. } | Outcome::DebugAborted { payload, .. } => {
                payload.clone()
            }
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::AwaitingInput { step } => write!(f, "awaiting input at {}", step.id),
            Outcome::Quiescent { step_id, .. } => write!(f, "quiescent after {}", step_id),
            Outcome::DebugAborted { step_id, .. } => write!(f, "debug aborted at {}", step_id),
        }
    }
}

/// One executed step.
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub step_id: String,
    pub route: String,
    /// Id of the committed message; empty when nothing was committed.
    pub message_id: String,
    /// Route of the response that selected the next step, if any.
    pub chosen_route: Option<String>,
    pub started: DateTime<Utc>,
    pub duration: Duration,
}

impl TickRecord {
    pub fn start(step: &WorkflowStep) -> Self {
        Self {
            step_id: step.id.clone(),
            route: step.route.clone(),
            message_id: String::new(),
            chosen_route: None,
            started: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn finish(&mut self) {
        self.duration = (Utc::now() - self.started)
            .to_std()
            .unwrap_or(Duration::ZERO);
    }

    pub fn is_committed(&self) -> bool {
        !self.message_id.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub ticks: Vec<TickRecord>,
    pub outcome: Outcome,
}

impl RunResult {
    /// Step ids in execution order.
    pub fn executed_steps(&self) -> Vec<&str> {
        self.ticks.iter().map(|t| t.step_id.as_str()).collect()
    }

    pub fn committed_ticks(&self) -> usize {
        self.ticks.iter().filter(|t| t.is_committed()).count()
    }

    pub fn duration(&self) -> Duration {
        (self.end_time - self.start_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
