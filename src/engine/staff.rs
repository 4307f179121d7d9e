//! Staff-driven operations: shifts, breaks, calling and completing applicants.
//!
//! Each operation re-reads the staff member and their in-progress ticket
//! inside its own transaction before changing anything, so two racing calls
//! for the same person cannot both pick up or both complete a ticket.

use tracing::field::display;

use super::tickets::{close_ticket, set_staff_status};
use super::{CallOutcome, Engine};
use crate::announce::Announcement;
use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::model::*;
use crate::telemetry::queue::{OperationTimer, record_state_transition, start_operation_span};

impl Engine {
    /// Begin a shift: offline staff become available.
    pub fn start_work(&mut self, staff: StaffId) -> Result<Staff> {
        self.change_staff_status("start_work", staff, |current, _| match current {
            StaffStatus::Offline | StaffStatus::Available => Ok(StaffStatus::Available),
            other => Err(Error::Precondition(format!(
                "staff is {other}; use resume to return from a break"
            ))),
        })
    }

    /// Take a break. Allowed mid-service; the in-progress ticket stays with
    /// the staff member and can still be completed.
    pub fn pause_work(&mut self, staff: StaffId) -> Result<Staff> {
        self.change_staff_status("pause_work", staff, |_, _| Ok(StaffStatus::Paused))
    }

    /// Return from a break: busy again if a ticket is still in progress,
    /// otherwise available.
    pub fn resume_work(&mut self, staff: StaffId) -> Result<Staff> {
        self.change_staff_status("resume_work", staff, |current, serving| match current {
            StaffStatus::Paused if serving => Ok(StaffStatus::Busy),
            StaffStatus::Paused | StaffStatus::Available => Ok(StaffStatus::Available),
            other => Err(Error::Precondition(format!("staff is {other}, not on a break"))),
        })
    }

    /// Shared body of the plain status setters. `decide` gets the current
    /// status and whether a ticket is in progress, and returns the target.
    fn change_staff_status<F>(
        &mut self,
        operation: &'static str,
        staff: StaffId,
        decide: F,
    ) -> Result<Staff>
    where
        F: FnOnce(StaffStatus, bool) -> Result<StaffStatus>,
    {
        let _timer = OperationTimer::start(operation);
        let span = start_operation_span(operation);
        let now = crate::model::now();

        let (member, change) = self.storage.with_transaction(|ctx| {
            let current = ctx.get_staff(staff)?;
            let serving = ctx.in_progress_for_staff(staff)?.is_some();
            let to = decide(current.status, serving)?;
            let change = set_staff_status(ctx, staff, to, now)?.map(|from| (from, to));
            Ok((ctx.get_staff(staff)?, change))
        })?;

        if let Some((from, to)) = change {
            record_state_transition(&span, "staff", from.as_str(), to.as_str());
        }
        Ok(member)
    }

    /// End a shift. Any in-progress ticket is completed first, then the staff
    /// member goes offline, in one transaction.
    pub fn finish_work(&mut self, staff: StaffId) -> Result<Staff> {
        let _timer = OperationTimer::start("finish_work");
        let span = start_operation_span("finish_work");
        let now = crate::model::now();

        let (member, forced, change) = self.storage.with_transaction(|ctx| {
            let forced = match ctx.in_progress_for_staff(staff)? {
                Some(ticket) => {
                    let ticket = close_ticket(ctx, ticket, TicketStatus::Completed, now)?;
                    ctx.record_event(EventKind::TicketCompleted {
                        id: ticket.id,
                        staff_id: Some(staff),
                        processing_secs: ticket.processing_secs,
                        forced: true,
                    })?;
                    Some(ticket)
                }
                None => None,
            };

            let change = set_staff_status(ctx, staff, StaffStatus::Offline, now)?
                .map(|from| (from, StaffStatus::Offline));
            Ok((ctx.get_staff(staff)?, forced, change))
        })?;

        if let Some(ticket) = &forced {
            span.record("ticket.id", display(ticket.id));
            span.record("ticket.seq_no", ticket.seq_no);
            record_state_transition(&span, "ticket", "in_progress", "completed");
            span.in_scope(|| {
                tracing::info!(
                    staff = %member.name,
                    processing_secs = ticket.processing_secs,
                    "in-progress ticket completed at end of shift"
                );
            });
            self.sync_archive(ticket);
        }
        if let Some((from, to)) = change {
            record_state_transition(&span, "staff", from.as_str(), to.as_str());
        }
        Ok(member)
    }

    /// Call the lowest-numbered waiting ticket assigned to this staff member.
    ///
    /// The staff member must be available. An empty personal queue is a
    /// normal outcome, not an error. The announcement is delivered after
    /// commit and its failure does not undo the call.
    pub fn call_next(&mut self, staff: StaffId) -> Result<CallOutcome> {
        let _timer = OperationTimer::start("call_next");
        let span = start_operation_span("call_next");
        let now = crate::model::now();

        let called = self.storage.with_transaction(|ctx| {
            let member = ctx.get_staff(staff)?;
            if member.status != StaffStatus::Available {
                return Err(Error::StaffNotAvailable {
                    staff: member.name,
                    status: member.status,
                });
            }

            let Some(mut ticket) = ctx.next_waiting_for_staff(staff)? else {
                return Ok(None);
            };

            if !ticket.status.can_transition_to(TicketStatus::InProgress) {
                return Err(Error::InvalidTransition {
                    from: ticket.status.to_string(),
                    to: TicketStatus::InProgress.to_string(),
                });
            }
            ticket.status = TicketStatus::InProgress;
            ticket.started_at = Some(now);
            ticket.updated_at = now;
            ctx.update_ticket(&ticket)?;

            set_staff_status(ctx, staff, StaffStatus::Busy, now)?;
            ctx.record_event(EventKind::TicketCalled {
                id: ticket.id,
                seq_no: ticket.seq_no,
                staff_id: staff,
            })?;

            Ok(Some((ticket, member)))
        })?;

        let Some((ticket, member)) = called else {
            tracing::debug!(staff_id = %staff, "no waiting tickets for staff");
            return Ok(CallOutcome::EmptyQueue);
        };

        span.record("ticket.id", display(ticket.id));
        span.record("ticket.seq_no", ticket.seq_no);
        record_state_transition(&span, "ticket", "waiting", "in_progress");
        record_state_transition(&span, "staff", "available", "busy");
        self.sync_archive(&ticket);

        let announcement = Announcement::render(
            ticket.seq_no,
            &ticket.full_name,
            member.desk.as_deref(),
            ticket.language.as_deref(),
        );
        self.announce(&announcement);

        Ok(CallOutcome::Called {
            ticket,
            announcement,
        })
    }

    /// Complete the ticket this staff member is serving.
    ///
    /// A busy staff member becomes available again. One who paused mid-service
    /// stays paused.
    pub fn complete_current(&mut self, staff: StaffId) -> Result<Staff> {
        let _timer = OperationTimer::start("complete_current");
        let span = start_operation_span("complete_current");
        let now = crate::model::now();

        let (member, ticket, change) = self.storage.with_transaction(|ctx| {
            let member = ctx.get_staff(staff)?;
            if !matches!(member.status, StaffStatus::Busy | StaffStatus::Paused) {
                return Err(Error::NotServing {
                    staff: member.name,
                    status: member.status,
                });
            }

            let ticket = ctx
                .in_progress_for_staff(staff)?
                .ok_or_else(|| Error::NoActiveTicket(member.name.clone()))?;
            let ticket = close_ticket(ctx, ticket, TicketStatus::Completed, now)?;
            ctx.record_event(EventKind::TicketCompleted {
                id: ticket.id,
                staff_id: Some(staff),
                processing_secs: ticket.processing_secs,
                forced: false,
            })?;

            let change = if member.status == StaffStatus::Busy {
                set_staff_status(ctx, staff, StaffStatus::Available, now)?
                    .map(|from| (from, StaffStatus::Available))
            } else {
                None
            };

            Ok((ctx.get_staff(staff)?, ticket, change))
        })?;

        span.record("ticket.id", display(ticket.id));
        span.record("ticket.seq_no", ticket.seq_no);
        record_state_transition(&span, "ticket", "in_progress", "completed");
        if let Some((from, to)) = change {
            record_state_transition(&span, "staff", from.as_str(), to.as_str());
        }
        self.sync_archive(&ticket);
        Ok(member)
    }

    /// This staff member's tickets in sequence order, optionally by status.
    pub fn staff_queue(&self, staff: StaffId, status: Option<TicketStatus>) -> Result<Vec<Ticket>> {
        let ctx = self.storage.ctx();
        ctx.get_staff(staff)?;
        ctx.tickets_for_staff(staff, status)
    }
}
