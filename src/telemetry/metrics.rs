//! Metric instrument factories for deskq.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"deskq"` meter. Without a
//! configured provider the global no-op meter swallows every measurement.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for deskq instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("deskq")
}

/// Counter: registration attempts.
/// Labels: `result` ("ok" | "duplicate" | "no_staff" | "capacity_exhausted" | "error").
pub fn tickets_registered() -> Counter<u64> {
    meter()
        .u64_counter("deskq.tickets.registered")
        .with_description("Number of ticket registration attempts")
        .build()
}

/// Counter: ticket state transitions.
/// Labels: `from`, `to`.
pub fn ticket_state_transitions() -> Counter<u64> {
    meter()
        .u64_counter("deskq.tickets.state_transitions")
        .with_description("Number of ticket state transitions")
        .build()
}

/// Counter: staff status transitions.
/// Labels: `from`, `to`.
pub fn staff_state_transitions() -> Counter<u64> {
    meter()
        .u64_counter("deskq.staff.state_transitions")
        .with_description("Number of staff status transitions")
        .build()
}

/// Counter: live tickets moved to the archive and deleted.
/// Labels: `reason` ("auto_cleanup" | "manual_reset"), `result` ("archived" | "skipped").
pub fn tickets_evicted() -> Counter<u64> {
    meter()
        .u64_counter("deskq.tickets.evicted")
        .with_description("Number of tickets evicted from the live queue")
        .build()
}

/// Counter: best-effort archive writes that failed after commit.
/// Labels: `operation` ("shadow" | "sync").
pub fn archive_sync_failures() -> Counter<u64> {
    meter()
        .u64_counter("deskq.archive.sync_failures")
        .with_description("Archive writes that failed after the live change committed")
        .build()
}

/// Histogram: operation duration in milliseconds.
/// Labels: `operation`.
pub fn operation_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("deskq.operation.duration_ms")
        .with_description("Operation duration in milliseconds")
        .with_unit("ms")
        .build()
}
