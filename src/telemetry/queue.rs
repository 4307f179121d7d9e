//! Queue operation span helpers.
//!
//! Provides span creation and state-transition recording for tickets and
//! staff moving through the engine.

use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::Span;

use super::metrics;

/// Start a span for one engine operation.
///
/// The `ticket.id` and `ticket.seq_no` fields are declared empty and filled
/// in once the operation knows which ticket it touched.
pub fn start_operation_span(operation: &'static str) -> Span {
    tracing::info_span!(
        "queue.operation",
        "queue.operation" = operation,
        "ticket.id" = tracing::field::Empty,
        "ticket.seq_no" = tracing::field::Empty,
    )
}

/// Record a state transition event on the given span and count it.
pub fn record_state_transition(span: &Span, entity: &'static str, from: &str, to: &str) {
    span.in_scope(|| {
        tracing::info!(entity = entity, from = from, to = to, "state_transition");
    });

    let attrs = [
        KeyValue::new("from", from.to_string()),
        KeyValue::new("to", to.to_string()),
    ];
    match entity {
        "staff" => metrics::staff_state_transitions().add(1, &attrs),
        _ => metrics::ticket_state_transitions().add(1, &attrs),
    }
}

/// Measures an operation from creation to drop.
pub struct OperationTimer {
    operation: &'static str,
    started: Instant,
}

impl OperationTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64() * 1000.0;
        metrics::operation_duration_ms()
            .record(elapsed, &[KeyValue::new("operation", self.operation)]);
    }
}
