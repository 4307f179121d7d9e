//! Integration tests for the queue engine: registration, staff lifecycle,
//! and the administrative ticket operations.

use std::sync::{Arc, Mutex};

use deskq::announce::{Announcement, Announcer};
use deskq::event::EventKind;
use deskq::model::*;
use deskq::{CallOutcome, Engine, Error, ErrorKind};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn test_engine() -> Engine {
    Engine::in_memory()
        .expect("failed to create in-memory engine")
        .with_rng(StdRng::seed_from_u64(7))
}

fn on_shift(engine: &mut Engine, name: &str, desk: &str) -> StaffId {
    let staff = engine.add_staff(name, Some(desk)).unwrap();
    engine.start_work(staff.id).unwrap();
    staff.id
}

fn applicant(n: u32) -> NewTicket {
    NewTicket::new(format!("Applicant {n}"), format!("+7701{n:07}")).program("finance")
}

fn called(outcome: CallOutcome) -> (Ticket, Announcement) {
    match outcome {
        CallOutcome::Called {
            ticket,
            announcement,
        } => (ticket, announcement),
        CallOutcome::EmptyQueue => panic!("expected a ticket to be called"),
    }
}

#[derive(Clone, Default)]
struct RecordingAnnouncer(Arc<Mutex<Vec<Announcement>>>);

impl Announcer for RecordingAnnouncer {
    fn announce(&self, announcement: &Announcement) -> deskq::Result<()> {
        self.0.lock().unwrap().push(announcement.clone());
        Ok(())
    }
}

struct BrokenSpeaker;

impl Announcer for BrokenSpeaker {
    fn announce(&self, _: &Announcement) -> deskq::Result<()> {
        Err(Error::Other("speaker offline".into()))
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn register_creates_waiting_ticket_assigned_to_staff() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");

    let ticket = engine
        .register(
            NewTicket::new("Aru Sadykova", "+77010000001")
                .programs(["finance", "marketing"])
                .note("transfer student")
                .language("kk"),
        )
        .unwrap();

    assert_eq!(ticket.seq_no, 1);
    assert_eq!(ticket.status, TicketStatus::Waiting);
    assert_eq!(ticket.programs, vec!["finance", "marketing"]);
    assert_eq!(ticket.language.as_deref(), Some("kk"));
    let assigned = ticket.assigned_staff.as_ref().unwrap();
    assert_eq!(assigned.id, staff);
    assert_eq!(assigned.desk.as_deref(), Some("4"));

    assert_eq!(engine.ticket(ticket.id).unwrap(), ticket);
}

#[test]
fn sequence_numbers_increase_from_the_current_max() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");

    let seqs: Vec<i64> = (0..4)
        .map(|n| engine.register(applicant(n)).unwrap().seq_no)
        .collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);
}

#[test]
fn duplicate_active_phone_is_rejected() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");

    let first = engine.register(applicant(1)).unwrap();
    let err = engine.register(applicant(1)).unwrap_err();
    assert!(matches!(err, Error::DuplicateActiveTicket { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Once the first ticket is finished the phone may queue again.
    engine.cancel(first.id, None).unwrap();
    let second = engine.register(applicant(1)).unwrap();
    assert_eq!(second.seq_no, 2);
}

#[test]
fn registration_fails_without_eligible_staff() {
    let mut engine = test_engine();

    let err = engine.register(applicant(1)).unwrap_err();
    assert!(matches!(err, Error::NoStaffAvailable));

    // Offline and paused staff don't count.
    let offline = engine.add_staff("Offline", None).unwrap();
    let paused = on_shift(&mut engine, "Paused", "2");
    engine.pause_work(paused).unwrap();
    let err = engine.register(applicant(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoStaffAvailable);

    engine.start_work(offline.id).unwrap();
    let ticket = engine.register(applicant(1)).unwrap();
    assert_eq!(ticket.assigned_staff.unwrap().id, offline.id);
}

#[test]
fn registration_validates_applicant_data() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");

    let err = engine.register(NewTicket::new("  ", "+77010000001").program("finance"));
    assert!(matches!(err, Err(Error::Validation(_))));

    let err = engine.register(NewTicket::new("Aru", "+77010000001"));
    assert!(matches!(err, Err(Error::Validation(_))));
}

#[test]
fn new_ticket_goes_to_least_loaded_staff() {
    let mut engine = test_engine();
    let b = on_shift(&mut engine, "Bolat", "2");
    engine.register(applicant(1)).unwrap();
    engine.register(applicant(2)).unwrap();

    let a = on_shift(&mut engine, "Aigerim", "1");
    let ticket = engine.register(applicant(3)).unwrap();
    assert_eq!(ticket.assigned_staff.unwrap().id, a);

    assert_eq!(engine.staff_queue(b, None).unwrap().len(), 2);
    assert_eq!(engine.staff_queue(a, None).unwrap().len(), 1);
}

#[test]
fn busy_staff_still_receive_new_tickets() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    let ticket = engine.register(applicant(2)).unwrap();
    assert_eq!(ticket.assigned_staff.unwrap().id, staff);
}

// ---------------------------------------------------------------------------
// Status check
// ---------------------------------------------------------------------------

#[test]
fn status_reports_position_among_waiting_tickets() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");

    let tickets: Vec<Ticket> = (1..=5)
        .map(|n| engine.register(applicant(n)).unwrap())
        .collect();
    engine.cancel(tickets[0].id, None).unwrap();
    engine.cancel(tickets[1].id, None).unwrap();

    let report = engine.check_status("Applicant 5").unwrap();
    assert_eq!(report.ticket.seq_no, 5);
    assert_eq!(report.position, Some(3));
    assert_eq!(report.people_ahead, Some(2));
    assert_eq!(report.estimated_wait_minutes, Some(10));
}

#[test]
fn status_has_no_position_once_called() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    let report = engine.check_status("Applicant 1").unwrap();
    assert_eq!(report.ticket.status, TicketStatus::InProgress);
    assert_eq!(report.position, None);
    assert_eq!(report.estimated_wait_minutes, None);

    let err = engine.check_status("Nobody").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ---------------------------------------------------------------------------
// Staff lifecycle
// ---------------------------------------------------------------------------

#[test]
fn call_next_takes_lowest_waiting_ticket_and_marks_staff_busy() {
    let announcer = RecordingAnnouncer::default();
    let mut engine = test_engine().with_announcer(announcer.clone());
    let staff = on_shift(&mut engine, "Dana", "4");
    let first = engine.register(applicant(1).language("en")).unwrap();
    engine.register(applicant(2)).unwrap();

    let (ticket, announcement) = called(engine.call_next(staff).unwrap());
    assert_eq!(ticket.id, first.id);
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert!(ticket.started_at.is_some());
    assert_eq!(
        announcement.text,
        "Ticket number 1, please proceed to desk 4"
    );
    assert_eq!(announcer.0.lock().unwrap().len(), 1);

    assert_eq!(engine.get_staff(staff).unwrap().status, StaffStatus::Busy);
    let serving = engine
        .staff_queue(staff, Some(TicketStatus::InProgress))
        .unwrap();
    assert_eq!(serving.len(), 1);
}

#[test]
fn call_next_requires_available_staff() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    engine.register(applicant(2)).unwrap();
    called(engine.call_next(staff).unwrap());

    let err = engine.call_next(staff).unwrap_err();
    assert!(matches!(
        err,
        Error::StaffNotAvailable {
            status: StaffStatus::Busy,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn call_next_with_nothing_waiting_is_not_an_error() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");

    let outcome = engine.call_next(staff).unwrap();
    assert!(matches!(outcome, CallOutcome::EmptyQueue));
    assert_eq!(
        engine.get_staff(staff).unwrap().status,
        StaffStatus::Available
    );
}

#[test]
fn failed_announcement_does_not_undo_the_call() {
    let mut engine = test_engine().with_announcer(BrokenSpeaker);
    let staff = on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();

    let (served, _) = called(engine.call_next(staff).unwrap());
    assert_eq!(served.id, ticket.id);
    assert_eq!(
        engine.ticket(ticket.id).unwrap().status,
        TicketStatus::InProgress
    );
}

#[test]
fn complete_current_records_processing_time_and_frees_staff() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    let member = engine.complete_current(staff).unwrap();
    assert_eq!(member.status, StaffStatus::Available);

    let done = engine.ticket(ticket.id).unwrap();
    assert_eq!(done.status, TicketStatus::Completed);
    assert!(done.processing_secs.unwrap() >= 0);
    assert!(
        engine
            .staff_queue(staff, Some(TicketStatus::InProgress))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn complete_after_mid_service_pause_keeps_staff_paused() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    engine.pause_work(staff).unwrap();
    let member = engine.complete_current(staff).unwrap();
    assert_eq!(member.status, StaffStatus::Paused);

    let member = engine.resume_work(staff).unwrap();
    assert_eq!(member.status, StaffStatus::Available);
}

#[test]
fn resume_with_ticket_in_progress_returns_to_busy() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    engine.pause_work(staff).unwrap();
    assert_eq!(engine.resume_work(staff).unwrap().status, StaffStatus::Busy);
}

#[test]
fn complete_requires_a_serving_staff_member() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");

    let err = engine.complete_current(staff).unwrap_err();
    assert!(matches!(err, Error::NotServing { .. }));

    // Paused without a ticket: allowed status, nothing to complete.
    engine.pause_work(staff).unwrap();
    let err = engine.complete_current(staff).unwrap_err();
    assert!(matches!(err, Error::NoActiveTicket(_)));
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn finish_work_force_completes_in_progress_ticket() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    let member = engine.finish_work(staff).unwrap();
    assert_eq!(member.status, StaffStatus::Offline);

    let done = engine.ticket(ticket.id).unwrap();
    assert_eq!(done.status, TicketStatus::Completed);
    assert!(done.processing_secs.is_some());

    let forced = engine
        .events_since(0)
        .unwrap()
        .into_iter()
        .any(|e| matches!(e.kind, EventKind::TicketCompleted { forced: true, id, .. } if id == ticket.id));
    assert!(forced);
}

#[test]
fn offline_staff_cannot_pause_and_busy_staff_cannot_restart() {
    let mut engine = test_engine();
    let staff = engine.add_staff("Dana", None).unwrap().id;

    let err = engine.pause_work(staff).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));

    engine.start_work(staff).unwrap();
    engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());
    let err = engine.start_work(staff).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

// ---------------------------------------------------------------------------
// Cancel, move back, update, delete
// ---------------------------------------------------------------------------

#[test]
fn cancel_marks_ticket_cancelled_not_completed() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();

    let cancelled = engine.cancel(ticket.id, Some("+77010000001")).unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);
    assert!(cancelled.processing_secs.is_none());

    let err = engine.cancel(ticket.id, None).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
}

#[test]
fn cancel_checks_caller_phone() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();

    let err = engine.cancel(ticket.id, Some("+70000000000")).unwrap_err();
    assert!(matches!(err, Error::NotOwner(id) if id == ticket.id));
    assert_eq!(
        engine.ticket(ticket.id).unwrap().status,
        TicketStatus::Waiting
    );
}

#[test]
fn cancelling_in_progress_ticket_frees_busy_staff() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    let cancelled = engine.cancel_by_phone("+77010000001").unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);
    assert!(cancelled.processing_secs.is_some());
    assert_eq!(
        engine.get_staff(staff).unwrap().status,
        StaffStatus::Available
    );

    let err = engine.cancel_by_phone("+77010000001").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn move_to_back_renumbers_past_the_current_max() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");
    let first = engine.register(applicant(1)).unwrap();
    engine.register(applicant(2)).unwrap();
    engine.register(applicant(3)).unwrap();

    let report = engine.move_to_back(first.id).unwrap();
    assert_eq!(report.ticket.seq_no, 4);
    assert_eq!(report.position, Some(3));
    assert_eq!(report.people_ahead, Some(2));
}

#[test]
fn move_to_back_only_for_waiting_tickets() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());

    let err = engine.move_to_back(ticket.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn update_edits_fields_and_pauses() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();

    let updated = engine
        .update(
            ticket.id,
            TicketUpdate {
                full_name: Some("Aru Sadykova".into()),
                programs: Some(vec!["law".into(), "  ".into()]),
                status: Some(TicketStatus::Paused),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.full_name, "Aru Sadykova");
    assert_eq!(updated.programs, vec!["law"]);
    assert_eq!(updated.status, TicketStatus::Paused);

    let resumed = engine
        .update(
            ticket.id,
            TicketUpdate {
                status: Some(TicketStatus::Waiting),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(resumed.status, TicketStatus::Waiting);
}

#[test]
fn update_cannot_start_or_complete_service() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();

    for status in [TicketStatus::InProgress, TicketStatus::Completed] {
        let err = engine
            .update(
                ticket.id,
                TicketUpdate {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    let err = engine.update(ticket.id, TicketUpdate::default()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn unpausing_respects_one_active_ticket_per_phone() {
    let mut engine = test_engine();
    on_shift(&mut engine, "Dana", "4");
    let paused = engine.register(applicant(1)).unwrap();
    engine
        .update(
            paused.id,
            TicketUpdate {
                status: Some(TicketStatus::Paused),
                ..Default::default()
            },
        )
        .unwrap();

    // A paused ticket is not active, so the phone can register again.
    engine.register(applicant(1)).unwrap();

    let err = engine
        .update(
            paused.id,
            TicketUpdate {
                status: Some(TicketStatus::Waiting),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateActiveTicket { .. }));
}

#[test]
fn delete_removes_ticket_but_refuses_in_progress() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    let serving = engine.register(applicant(1)).unwrap();
    let waiting = engine.register(applicant(2)).unwrap();
    called(engine.call_next(staff).unwrap());

    let err = engine.delete_ticket(serving.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    engine.delete_ticket(waiting.id).unwrap();
    let err = engine.ticket(waiting.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[test]
fn list_filters_combine() {
    let mut engine = test_engine();
    let dana = on_shift(&mut engine, "Dana Serikova", "4");
    engine
        .register(NewTicket::new("Aru Sadykova", "+77010000001").program("appliedLinguistics"))
        .unwrap();
    engine.finish_work(dana).unwrap();
    on_shift(&mut engine, "Marat", "5");
    engine
        .register(NewTicket::new("Ivan Petrov", "+77010000002").program("finance"))
        .unwrap();

    let all = engine.list(&TicketFilter::default()).unwrap();
    assert_eq!(all.len(), 2);

    let by_program = engine
        .list(&TicketFilter {
            program: Some("Прикладная лингвистика".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_program.len(), 1);
    assert_eq!(by_program[0].full_name, "Aru Sadykova");

    let by_staff = engine
        .list(&TicketFilter {
            staff_name: Some("serik".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_staff.len(), 1);

    let by_name_and_status = engine
        .list(&TicketFilter {
            applicant_name: Some("petrov".into()),
            status: Some(TicketStatus::Waiting),
            date: Some(chrono::Utc::now().date_naive()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_name_and_status.len(), 1);
    assert_eq!(by_name_and_status[0].full_name, "Ivan Petrov");
}

#[test]
fn public_board_shows_serving_tickets_and_active_count() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    engine.register(applicant(2)).unwrap();
    called(engine.call_next(staff).unwrap());

    let serving = engine.now_serving().unwrap();
    assert_eq!(serving.len(), 1);
    assert_eq!(serving[0].seq_no, 1);
    assert_eq!(serving[0].desk.as_deref(), Some("4"));
    assert_eq!(engine.waiting_count().unwrap(), 2);

    let mine = engine.active_by_phone("+77010000002").unwrap().unwrap();
    assert_eq!(mine.seq_no, 2);
    assert!(engine.active_by_phone("+70000000000").unwrap().is_none());
}

#[test]
fn every_transition_is_recorded_as_an_event() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    engine.register(applicant(1)).unwrap();
    called(engine.call_next(staff).unwrap());
    engine.complete_current(staff).unwrap();

    let kinds: Vec<&'static str> = engine
        .events_since(0)
        .unwrap()
        .iter()
        .map(|e| match e.kind {
            EventKind::StaffStatusChanged { .. } => "staff",
            EventKind::TicketRegistered { .. } => "registered",
            EventKind::TicketCalled { .. } => "called",
            EventKind::TicketCompleted { .. } => "completed",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["staff", "registered", "staff", "called", "completed", "staff"]
    );
}

// ---------------------------------------------------------------------------
// Staff roster
// ---------------------------------------------------------------------------

#[test]
fn staff_can_be_resolved_by_name_or_id() {
    let mut engine = test_engine();
    let dana = engine.add_staff("Dana", Some("4")).unwrap();

    assert_eq!(engine.resolve_staff("Dana").unwrap().id, dana.id);
    assert_eq!(engine.resolve_staff(&dana.id.to_string()).unwrap().id, dana.id);

    engine.add_staff("Dana", Some("9")).unwrap();
    let err = engine.resolve_staff("Dana").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(
        engine.resolve_staff("Nobody").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn set_desk_shows_up_on_assigned_tickets() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();

    engine.set_desk(staff, Some("12")).unwrap();
    let ticket = engine.ticket(ticket.id).unwrap();
    assert_eq!(ticket.assigned_staff.unwrap().desk.as_deref(), Some("12"));
}

#[test]
fn staff_with_active_tickets_cannot_be_removed() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();

    let err = engine.remove_staff(staff).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    engine.cancel(ticket.id, None).unwrap();
    engine.remove_staff(staff).unwrap();
    assert!(engine.list_staff().unwrap().is_empty());

    // Finished tickets survive without the staff link.
    let ticket = engine.ticket(ticket.id).unwrap();
    assert!(ticket.assigned_staff.is_none());
}

#[test]
fn staff_with_paused_tickets_cannot_be_removed() {
    let mut engine = test_engine();
    let staff = on_shift(&mut engine, "Dana", "4");
    let ticket = engine.register(applicant(1)).unwrap();
    engine
        .update(
            ticket.id,
            TicketUpdate {
                status: Some(TicketStatus::Paused),
                ..Default::default()
            },
        )
        .unwrap();

    let err = engine.remove_staff(staff).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(err.to_string().contains("unfinished"));

    // The paused ticket keeps its staff member and can still be served.
    let ticket = engine
        .update(
            ticket.id,
            TicketUpdate {
                status: Some(TicketStatus::Waiting),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(ticket.assigned_staff.as_ref().map(|s| s.id), Some(staff));
    let (served, _) = called(engine.call_next(staff).unwrap());
    assert_eq!(served.id, ticket.id);
}
