// ABOUTME: Step execution engine advancing a workflow one tick at a time
// ABOUTME: Resolves, merges, acts, routes, gates, commits, then follows decisions until a halt

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::config::EngineConfig;
use super::decision;
use super::error::{ExecutionError, Result};
use super::gate::{ConsoleGate, DebugGate};
use super::result::{Outcome, RunResult, TickRecord};
use crate::parser::{ParserError, WorkflowGraph, WorkflowStep};
use crate::payload::{Activity, ActivityMessage, Payload, PayloadError};
use crate::routes::{RouteDefinition, RouteTable};

/// What a single tick decided.
enum TickFlow {
    Continue { next_step: String, payload: Payload },
    Stop(Outcome),
}

pub struct WorkflowEngine {
    routes: Arc<RouteTable>,
    config: EngineConfig,
    gate: Box<dyn DebugGate>,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("routes", &self.routes.len())
            .field("config", &self.config)
            .finish()
    }
}

impl WorkflowEngine {
    /// Create an engine whose debug gate talks to stdin/stdout.
    pub fn new(routes: Arc<RouteTable>, config: EngineConfig) -> Self {
        Self {
            routes,
            config,
            gate: Box::new(ConsoleGate::stdio()),
        }
    }

    /// Replace the debug gate.
    pub fn with_gate(mut self, gate: Box<dyn DebugGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decode a graph and payload from their JSON forms, then execute.
    /// Nothing runs if either fails to decode.
    pub fn execute_json<F>(
        &mut self,
        raw_graph: &str,
        raw_payload: &str,
        resume_step: &str,
        activity: &mut Activity,
        on_commit: F,
    ) -> Result<RunResult>
    where
        F: FnMut(&ActivityMessage),
    {
        let graph = WorkflowGraph::parse(raw_graph).map_err(|e| match e {
            ParserError::JsonError(source) => ExecutionError::Decode {
                what: "workflow graph",
                source,
            },
            other => other.into(),
        })?;
        let payload = Payload::from_json(raw_payload).map_err(|e| match e {
            PayloadError::Decode(source) => ExecutionError::Decode {
                what: "payload",
                source,
            },
            other => other.into(),
        })?;

        self.execute(&graph, payload, resume_step, activity, on_commit)
    }

    /// Run the workflow from `resume_step` (the first step when empty) until it
    /// waits for input, runs out of accepted responses, or is aborted.
    ///
    /// `on_commit` is called once per committed tick with the outbound message,
    /// which is also appended to the activity thread.
    #[instrument(skip_all, fields(resume = %resume_step, activity = %activity.id))]
    pub fn execute<F>(
        &mut self,
        graph: &WorkflowGraph,
        incoming: Payload,
        resume_step: &str,
        activity: &mut Activity,
        mut on_commit: F,
    ) -> Result<RunResult>
    where
        F: FnMut(&ActivityMessage),
    {
        let run_id = uuid::Uuid::new_v4().to_string();
        let start_time = Utc::now();
        let mut ticks = Vec::new();

        let mut step = match graph.resolve(resume_step) {
            Ok(step) => step,
            Err(ParserError::StepNotFound { step_id }) => {
                warn!("Cannot resume at unknown step {}", step_id);
                return Err(ExecutionError::StepNotFound {
                    step_id,
                    payload: Box::new(incoming),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let mut payload = incoming;

        info!("Starting run {} at step {}", run_id, step.id);

        loop {
            if let Some(limit) = self.config.max_chain_length {
                if ticks.len() >= limit {
                    warn!("Run {} stopped at chain limit {}", run_id, limit);
                    return Err(ExecutionError::ChainLimitExceeded {
                        limit,
                        payload: Box::new(payload),
                    });
                }
            }

            let mut record = TickRecord::start(step);
            let flow = self.tick(graph, step, payload, activity, &mut on_commit, &mut record);
            record.finish();
            ticks.push(record);

            match flow? {
                TickFlow::Stop(outcome) => {
                    info!("Run {} finished: {}", run_id, outcome);
                    return Ok(RunResult {
                        run_id,
                        start_time,
                        end_time: Utc::now(),
                        ticks,
                        outcome,
                    });
                }
                TickFlow::Continue {
                    next_step,
                    payload: next_payload,
                } => {
                    step = graph.resolve(&next_step)?;
                    payload = next_payload;
                }
            }
        }
    }

    fn tick<F>(
        &mut self,
        graph: &WorkflowGraph,
        step: &WorkflowStep,
        incoming: Payload,
        activity: &mut Activity,
        on_commit: &mut F,
        record: &mut TickRecord,
    ) -> Result<TickFlow>
    where
        F: FnMut(&ActivityMessage),
    {
        info!("Executing step {} (route: {})", step.id, step.route);

        let mut working = self.baseline(activity);
        working.merge(&incoming);
        if !activity.id.is_empty() {
            working.set_activity_id(activity.id.clone());
        }

        let routes = Arc::clone(&self.routes);
        let route = match routes.lookup(&step.route) {
            Some(definition) if definition.is_defined() => definition,
            _ => {
                info!("Route {} is unregistered, bypassing step {}", step.route, step.id);
                return Ok(TickFlow::Stop(self.bypass(step, working)));
            }
        };

        let mut message = ActivityMessage::new(step.template.clone());
        message.prepare();
        working.set_pathchain_id(message.id.clone());

        self.act(route, step, &mut working);
        self.apply_routing(step, &mut working);
        message.envelope = working.clone();

        if working.debug() && !self.gate.confirm(&message) {
            info!("Step {} aborted at the debug gate", step.id);
            return Ok(TickFlow::Stop(Outcome::DebugAborted {
                step_id: step.id.clone(),
                payload: working,
            }));
        }

        on_commit(&message);
        record.message_id = message.id.clone();
        activity.record(message);
        working.set_invoked_by("");

        if step.user_input {
            let mut waiting = step.clone();
            waiting.payload = Some(working.to_value());
            return Ok(TickFlow::Stop(Outcome::AwaitingInput { step: waiting }));
        }

        let Some(response) = decision::evaluate(&routes, &step.responses, &working) else {
            debug!("No response accepted after step {}", step.id);
            return Ok(TickFlow::Stop(Outcome::Quiescent {
                step_id: step.id.clone(),
                payload: working,
            }));
        };

        working.set_route_id(response.route.clone());
        record.chosen_route = Some(response.route.clone());

        if !graph.has_step(&response.step_id) {
            warn!(
                "Response {} from step {} targets missing step {:?}",
                response.route, step.id, response.step_id
            );
            return Err(ExecutionError::NextStepMissing {
                from_step: step.id.clone(),
                step_id: response.step_id.clone(),
                payload: Box::new(working),
            });
        }

        debug!("Step {} continues to {}", step.id, response.step_id);
        Ok(TickFlow::Continue {
            next_step: response.step_id.clone(),
            payload: working,
        })
    }

    /// Copy of the activity's latest committed envelope with volatile arrays
    /// emptied, or an empty payload for a fresh activity.
    fn baseline(&self, activity: &Activity) -> Payload {
        match activity.last_entry() {
            Some(entry) => {
                let mut baseline = entry.envelope.clone();
                baseline.empty_volatile_arrays(&self.config.volatile_fields);
                debug!("Merging onto thread entry {}", entry.id);
                baseline
            }
            None => Payload::new(),
        }
    }

    fn act(&self, route: &RouteDefinition, step: &WorkflowStep, working: &mut Payload) {
        if route.has_action() {
            debug!("Running action {} for step {}", route.name, step.id);
        }
        route.run_action(step, working);
    }

    /// Synthesized halt for steps whose route has no registered behaviour.
    fn bypass(&self, step: &WorkflowStep, mut working: Payload) -> Outcome {
        ensure_recipients(&mut working);

        let mut bypass = WorkflowStep::new(String::new(), self.config.bypass_route.clone())
            .with_user_input(true)
            .with_payload(working.to_value());
        bypass
            .extra
            .insert("bypassedStep".to_string(), step.id.clone().into());

        Outcome::AwaitingInput { step: bypass }
    }

    /// Compute sender and recipients, then stamp the executed step.
    fn apply_routing(&self, step: &WorkflowStep, working: &mut Payload) {
        if step.sender.is_empty() {
            working.set_sender(working.from_actor());
        } else {
            let sender = self.resolve_actor(&step.sender, working).unwrap_or_default();
            working.set_sender(sender);
        }

        if !step.send_to.is_empty() {
            match self.resolve_actor(&step.send_to, working) {
                Some(recipient) => working.add_recipient(recipient),
                None => debug!("sendTo {} resolved to nothing", step.send_to),
            }
        }

        ensure_recipients(working);
        if working.sender().is_empty() {
            working.set_sender(working.from_actor());
        }

        working.set_workflow_id(step.id.clone());
    }

    /// Resolve a `sender`/`sendTo` expression. The admin sentinel maps to the
    /// configured administrative actor; anything else is a path under the
    /// payload context.
    fn resolve_actor(&self, expression: &str, working: &Payload) -> Option<String> {
        if self.config.is_admin_sentinel(expression) {
            return Some(self.config.admin_actor.clone());
        }

        let path = if self.config.context_root.is_empty() {
            expression.to_string()
        } else {
            format!("{}.{}", self.config.context_root, expression)
        };

        working.lookup(&path).filter(|actor| !actor.is_empty())
    }
}

/// `to` falls back to the origin actor when nobody else was resolved.
fn ensure_recipients(working: &mut Payload) {
    if !working.has_recipients() {
        let origin = working.from_actor();
        working.add_recipient(origin);
    }
}
