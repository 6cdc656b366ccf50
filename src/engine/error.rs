// ABOUTME: Error types for workflow step execution
// ABOUTME: Failures that stop a run carry the payload as it stood when execution stopped

use thiserror::Error;

use crate::payload::Payload;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Step not found: {step_id}")]
    StepNotFound {
        step_id: String,
        payload: Box<Payload>,
    },

    #[error("Next step does not exist: {step_id} (chosen after {from_step})")]
    NextStepMissing {
        from_step: String,
        step_id: String,
        payload: Box<Payload>,
    },

    #[error("Workflow chain exceeded {limit} automatic steps")]
    ChainLimitExceeded { limit: usize, payload: Box<Payload> },

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Parser error: {0}")]
    ParserError(#[from] crate::parser::ParserError),

    #[error("Payload error: {0}")]
    PayloadError(#[from] crate::payload::PayloadError),
}

impl ExecutionError {
    /// The payload preserved by errors raised after decoding succeeded.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ExecutionError::StepNotFound { payload, .. }
            | ExecutionError::NextStepMissing { payload, .. }
            | ExecutionError::ChainLimitExceeded { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn into_payload(self) -> Option<Payload> {
        match self {
            ExecutionError::StepNotFound { payload, .. }
            | ExecutionError::NextStepMissing { payload, .. }
            | ExecutionError::ChainLimitExceeded { payload, .. } => Some(*payload),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserError;

    #[test]
    fn test_payload_is_preserved_for_run_failures() {
        let mut payload = Payload::new();
        payload.set_from("alice");

        let err = ExecutionError::NextStepMissing {
            from_step: "s1".to_string(),
            step_id: "ghost".to_string(),
            payload: Box::new(payload.clone()),
        };
        assert_eq!(err.payload(), Some(&payload));
        assert_eq!(err.into_payload(), Some(payload));
    }

    #[test]
    fn test_decode_failures_carry_no_payload() {
        let err = ExecutionError::from(ParserError::EmptyWorkflow);
        assert!(err.payload().is_none());
        assert!(err.into_payload().is_none());
    }
}
