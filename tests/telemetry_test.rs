//! Integration tests for telemetry initialization and span helpers.

use deskq::telemetry::queue::{OperationTimer, record_state_transition, start_operation_span};

#[test]
fn telemetry_initializes_without_endpoint() {
    // The global subscriber can only be set once per process, so this may
    // return Err if another test got there first; that is acceptable.
    let config = deskq::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "deskq-test".to_string(),
        log_level: "debug".to_string(),
    };
    if let Ok(guard) = deskq::telemetry::init_telemetry(config) {
        assert!(!guard.is_exporting());
    }
}

#[test]
fn operation_span_records_transitions() {
    let span = start_operation_span("call_next");
    span.record("ticket.seq_no", 7);
    record_state_transition(&span, "ticket", "waiting", "in_progress");
    record_state_transition(&span, "staff", "available", "busy");
}

#[test]
fn operation_timer_records_on_drop() {
    let timer = OperationTimer::start("register");
    drop(timer);
}

#[test]
fn engine_operations_run_under_telemetry() {
    let _guard = deskq::telemetry::init_telemetry(deskq::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "deskq-test".to_string(),
        log_level: "info".to_string(),
    });

    let mut engine = deskq::Engine::in_memory().unwrap();
    let staff = engine.add_staff("Aru", Some("3")).unwrap();
    engine.start_work(staff.id).unwrap();
    engine
        .register(deskq::model::NewTicket::new("Telemetry Test", "+77010000042").program("it"))
        .unwrap();
    engine.call_next(staff.id).unwrap();
    engine.complete_current(staff.id).unwrap();
}
