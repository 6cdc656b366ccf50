// ABOUTME: Route table mapping route keys to pluggable action and decision handlers
// ABOUTME: An absent or unnamed entry means the route has no registered behaviour

pub mod builtin;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::parser::{WorkflowResponse, WorkflowStep};
use crate::payload::Payload;

/// Runs a step's side effects against the working payload.
pub trait Action: Send + Sync {
    fn run(&self, step: &WorkflowStep, payload: &mut Payload);
}

/// Tests whether a candidate response applies to the current payload.
pub trait Decision: Send + Sync {
    fn decide(&self, response: &WorkflowResponse, payload: &Payload) -> bool;
}

impl<F> Action for F
where
    F: Fn(&WorkflowStep, &mut Payload) + Send + Sync,
{
    fn run(&self, step: &WorkflowStep, payload: &mut Payload) {
        self(step, payload)
    }
}

impl<F> Decision for F
where
    F: Fn(&WorkflowResponse, &Payload) -> bool + Send + Sync,
{
    fn decide(&self, response: &WorkflowResponse, payload: &Payload) -> bool {
        self(response, payload)
    }
}

/// A registered route: descriptive metadata plus optional handlers.
#[derive(Clone, Default, Serialize)]
pub struct RouteDefinition {
    pub section: String,
    pub method: String,
    pub name: String,
    #[serde(serialize_with = "serialize_defined")]
    pub action: Option<Arc<dyn Action>>,
    #[serde(serialize_with = "serialize_defined")]
    pub decision: Option<Arc<dyn Decision>>,
}

fn serialize_defined<T: ?Sized, S: serde::Serializer>(
    handler: &Option<Arc<T>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_bool(handler.is_some())
}

impl RouteDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_section(mut self, section: impl Into<String>, method: impl Into<String>) -> Self {
        self.section = section.into();
        self.method = method.into();
        self
    }

    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn with_decision(mut self, decision: impl Decision + 'static) -> Self {
        self.decision = Some(Arc::new(decision));
        self
    }

    pub fn is_defined(&self) -> bool {
        !self.name.is_empty()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn has_decision(&self) -> bool {
        self.decision.is_some()
    }

    /// Run the action, if any. A route without an action does nothing.
    pub fn run_action(&self, step: &WorkflowStep, payload: &mut Payload) {
        if let Some(action) = &self.action {
            action.run(step, payload);
        }
    }

    /// Run the decision, if any. A route without a decision rejects.
    pub fn decide(&self, response: &WorkflowResponse, payload: &Payload) -> bool {
        self.decision
            .as_ref()
            .map(|decision| decision.decide(response, payload))
            .unwrap_or(false)
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("section", &self.section)
            .field("method", &self.method)
            .field("name", &self.name)
            .field("action", &self.has_action())
            .field("decision", &self.has_decision())
            .finish()
    }
}

/// Route key to handler registry. Populated up front, then only read.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteDefinition>,
}

/// Listing entry returned by [`RouteTable::describe`].
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub key: String,
    #[serde(flatten)]
    pub definition: RouteDefinition,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the `STANDARD.*` routes.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        builtin::register_all(&mut table);
        table
    }

    pub fn register(&mut self, key: impl Into<String>, definition: RouteDefinition) {
        self.routes.insert(key.into(), definition);
    }

    pub fn lookup(&self, key: &str) -> Option<&RouteDefinition> {
        self.routes.get(key)
    }

    /// A route counts as registered only when its entry carries a name.
    pub fn is_registered(&self, key: &str) -> bool {
        self.lookup(key).map(RouteDefinition::is_defined).unwrap_or(false)
    }

    /// Registered entries sorted by key, for listings.
    pub fn describe(&self) -> Vec<RouteSummary> {
        let mut summaries: Vec<RouteSummary> = self
            .routes
            .iter()
            .map(|(key, definition)| RouteSummary {
                key: key.clone(),
                definition: definition.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        summaries
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
