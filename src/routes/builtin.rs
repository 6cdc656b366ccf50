// ABOUTME: Built-in STANDARD.* routes available to every workflow
// ABOUTME: Provides no-op and payload-merge actions plus constant and field-check decisions

use tracing::{debug, warn};

use super::{Action, Decision, RouteDefinition, RouteTable};
use crate::parser::{WorkflowResponse, WorkflowStep};
use crate::payload::Payload;

pub const NOOP: &str = "STANDARD.NOOP";
pub const MERGE: &str = "STANDARD.MERGE";
pub const ALWAYS: &str = "STANDARD.ALWAYS";
pub const NEVER: &str = "STANDARD.NEVER";
pub const FIELD_CHECK: &str = "STANDARD.FIELD_CHECK";

const SECTION: &str = "standard";

pub fn register_all(table: &mut RouteTable) {
    table.register(
        NOOP,
        RouteDefinition::new("No-op")
            .with_section(SECTION, "noop")
            .with_action(NoopAction),
    );
    table.register(
        MERGE,
        RouteDefinition::new("Merge step payload")
            .with_section(SECTION, "merge")
            .with_action(MergeAction),
    );
    table.register(
        ALWAYS,
        RouteDefinition::new("Always")
            .with_section(SECTION, "always")
            .with_decision(ConstantDecision(true)),
    );
    table.register(
        NEVER,
        RouteDefinition::new("Never")
            .with_section(SECTION, "never")
            .with_decision(ConstantDecision(false)),
    );
    table.register(
        FIELD_CHECK,
        RouteDefinition::new("Field check")
            .with_section(SECTION, "field_check")
            .with_decision(FieldCheckDecision),
    );
}

pub struct NoopAction;

impl Action for NoopAction {
    fn run(&self, _step: &WorkflowStep, _payload: &mut Payload) {}
}

/// Merges the step's static `payload` object into the working payload.
pub struct MergeAction;

impl Action for MergeAction {
    fn run(&self, step: &WorkflowStep, payload: &mut Payload) {
        match step.payload_object() {
            Ok(overlay) => {
                debug!("Merging {} static keys from step {}", overlay.len(), step.id);
                payload.merge(&overlay);
            }
            Err(e) => warn!("Step {} has an unusable static payload: {}", step.id, e),
        }
    }
}

pub struct ConstantDecision(pub bool);

impl Decision for ConstantDecision {
    fn decide(&self, _response: &WorkflowResponse, _payload: &Payload) -> bool {
        self.0
    }
}

/// Interprets the response's `fieldCheck`.
///
/// `path=value` accepts when the payload text at `path` equals `value`.
/// A bare `path` accepts when the field is present and not `false` or empty.
pub struct FieldCheckDecision;

impl Decision for FieldCheckDecision {
    fn decide(&self, response: &WorkflowResponse, payload: &Payload) -> bool {
        let check = response.field_check.trim();
        if check.is_empty() {
            return false;
        }

        match check.split_once('=') {
            Some((path, expected)) => {
                payload.lookup(path.trim()).as_deref() == Some(expected.trim())
            }
            None => match payload.lookup(check) {
                Some(text) => !text.is_empty() && text != "false",
                None => false,
            },
        }
    }
}
