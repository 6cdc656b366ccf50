// ABOUTME: Decision evaluation over a step's candidate responses
// ABOUTME: Tests responses in list order and stops at the first one whose decision accepts

use tracing::debug;

use crate::parser::WorkflowResponse;
use crate::payload::Payload;
use crate::routes::RouteTable;

/// Return the first response whose route's decision accepts `payload`.
///
/// Responses are tried strictly in order and evaluation short-circuits on the
/// first acceptance. A response whose route has no decision handler rejects.
/// `None` means no automatic transition applies.
pub fn evaluate<'a>(
    routes: &RouteTable,
    responses: &'a [WorkflowResponse],
    payload: &Payload,
) -> Option<&'a WorkflowResponse> {
    responses.iter().find(|response| {
        let accepted = routes
            .lookup(&response.route)
            .map(|definition| definition.decide(response, payload))
            .unwrap_or(false);
        debug!(
            "Decision {} for step {}: {}",
            response.route,
            response.step_id,
            if accepted { "accepted" } else { "rejected" }
        );
        accepted
    })
}
