// ABOUTME: Workflow step and response structures as they appear in graph JSON
// ABOUTME: Keeps descriptive and UI fields as pass-through data alongside the routing fields

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::{Payload, Result as PayloadResult};

/// One node of a workflow graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub user_input: bool,
    /// Static data for the step's action; on a returned step, the finalized payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(
        default,
        rename = "response",
        alias = "responses",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub responses: Vec<WorkflowResponse>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub am: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub replace_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    /// Field path (under the payload context) naming the sender.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sender: String,
    /// Field path (under the payload context) naming an extra recipient.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub send_to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub child_workflow: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub child_context: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_external: bool,
    #[serde(default, rename = "_comment", skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Keys the engine does not know about, preserved verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One candidate branch out of a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    #[serde(default)]
    pub route: String,
    #[serde(default, rename = "stepID")]
    pub step_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub style: String,
    #[serde(default, rename = "fieldCheck", skip_serializing_if = "String::is_empty")]
    pub field_check: String,
    #[serde(default, rename = "_comment", skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Editor canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub x: f64,
    #[serde(default, rename = "Y")]
    pub y: f64,
}

impl WorkflowStep {
    pub fn new(id: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            route: route.into(),
            ..Default::default()
        }
    }

    pub fn with_user_input(mut self, user_input: bool) -> Self {
        self.user_input = user_input;
        self
    }

    pub fn with_response(mut self, response: WorkflowResponse) -> Self {
        self.responses.push(response);
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn with_send_to(mut self, send_to: impl Into<String>) -> Self {
        self.send_to = send_to.into();
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The step's `payload` field read as a [`Payload`]; absent or null reads as empty.
    pub fn payload_object(&self) -> PayloadResult<Payload> {
        match &self.payload {
            None | Some(Value::Null) => Ok(Payload::new()),
            Some(value) => Payload::from_value(value.clone()),
        }
    }
}

impl WorkflowResponse {
    pub fn new(route: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            step_id: step_id.into(),
            ..Default::default()
        }
    }

    pub fn with_field_check(mut self, field_check: impl Into<String>) -> Self {
        self.field_check = field_check.into();
        self
    }

    /// A response with no target, as produced when no candidate is accepted.
    pub fn is_empty(&self) -> bool {
        self.route.is_empty() && self.step_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_wire_names() {
        let raw = json!({
            "id": "approve",
            "route": "APPROVAL.REQUEST",
            "template": "approval-request",
            "userInput": true,
            "sendTo": "manager.id",
            "childWorkflow": "wf-2",
            "isExternal": true,
            "_comment": "waits for the manager",
            "location": { "x": 10.0, "Y": 20.5 },
            "response": [
                { "route": "STANDARD.ALWAYS", "stepID": "done", "label": "Ok",
                  "icon": "check", "style": "primary", "fieldCheck": "status=ok" }
            ],
            "color": "teal"
        });

        let step: WorkflowStep = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(step.id, "approve");
        assert!(step.user_input);
        assert_eq!(step.send_to, "manager.id");
        assert!(step.is_external);
        assert_eq!(step.location, Some(Location { x: 10.0, y: 20.5 }));
        assert_eq!(step.responses[0].step_id, "done");
        assert_eq!(step.responses[0].field_check, "status=ok");
        assert_eq!(step.extra.get("color"), Some(&json!("teal")));

        let back = serde_json::to_value(&step).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_responses_alias_accepted() {
        let step: WorkflowStep = serde_json::from_value(json!({
            "id": "s1",
            "responses": [{ "route": "d1", "stepID": "s2" }]
        }))
        .unwrap();
        assert_eq!(step.responses.len(), 1);
        assert_eq!(step.route, "");
        assert!(!step.user_input);
    }

    #[test]
    fn test_payload_object() {
        let step = WorkflowStep::new("s1", "r1").with_payload(json!({ "status": "open" }));
        assert_eq!(
            step.payload_object().unwrap().get("status"),
            Some(&json!("open"))
        );

        assert!(WorkflowStep::new("s1", "r1").payload_object().unwrap().is_empty());
        assert!(WorkflowStep::new("s1", "r1")
            .with_payload(json!([1]))
            .payload_object()
            .is_err());
    }

    #[test]
    fn test_empty_response() {
        assert!(WorkflowResponse::default().is_empty());
        assert!(!WorkflowResponse::new("d1", "s2").is_empty());
    }
}
