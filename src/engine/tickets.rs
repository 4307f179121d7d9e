//! Applicant-facing and administrative ticket operations.

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use tracing::field::display;

use super::Engine;
use crate::balancer::select_employee;
use crate::capacity;
use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::model::*;
use crate::storage::TxContext;
use crate::telemetry::metrics;
use crate::telemetry::queue::{OperationTimer, record_state_transition, start_operation_span};

impl Engine {
    /// Register an applicant.
    ///
    /// Duplicate check, capacity guard, staff selection, sequence allocation,
    /// and insert run in one transaction. The ledger's shadow row is written
    /// after commit.
    pub fn register(&mut self, new: NewTicket) -> Result<Ticket> {
        let _timer = OperationTimer::start("register");
        let span = start_operation_span("register");
        let now = crate::model::now();

        let result = match new.normalized() {
            Ok(new) => {
                let capacity = self.settings.capacity;
                let rng = self.rng.as_mut();
                self.storage.with_transaction(|ctx| {
                    if ctx.active_ticket_for_phone(&new.phone)?.is_some() {
                        return Err(Error::DuplicateActiveTicket { phone: new.phone });
                    }

                    capacity::ensure_room_for_new_ticket(ctx, capacity, now)?;

                    let workloads = ctx.workloads()?;
                    let staff = select_employee(&workloads, rng)
                        .ok_or(Error::NoStaffAvailable)?
                        .staff
                        .clone();
                    let staff_id = staff.id;

                    let ticket = Ticket {
                        id: TicketId::new(),
                        seq_no: ctx.max_seq_no()?.unwrap_or(0) + 1,
                        full_name: new.full_name,
                        phone: new.phone,
                        programs: new.programs,
                        status: TicketStatus::Waiting,
                        assigned_staff: Some(staff),
                        notes: new.notes,
                        language: new.language,
                        created_at: now,
                        updated_at: now,
                        started_at: None,
                        processing_secs: None,
                    };
                    ctx.insert_ticket(&ticket)?;

                    ctx.record_event(EventKind::TicketRegistered {
                        id: ticket.id,
                        seq_no: ticket.seq_no,
                        staff_id,
                    })?;

                    Ok(ticket)
                })
            }
            Err(e) => Err(e),
        };

        let label = match &result {
            Ok(_) => "ok",
            Err(Error::DuplicateActiveTicket { .. }) => "duplicate",
            Err(Error::NoStaffAvailable) => "no_staff",
            Err(Error::CapacityExhausted { .. }) => "capacity_exhausted",
            Err(Error::Validation(_)) => "invalid",
            Err(_) => "error",
        };
        metrics::tickets_registered().add(1, &[KeyValue::new("result", label)]);

        let ticket = result?;
        span.record("ticket.id", display(ticket.id));
        span.record("ticket.seq_no", ticket.seq_no);
        span.in_scope(|| {
            tracing::info!(
                staff = ticket.assigned_staff.as_ref().map(|s| s.name.as_str()).unwrap_or("-"),
                programs = ?ticket.programs,
                "ticket registered"
            );
        });

        self.shadow_archive(&ticket, ArchiveReason::AutoBackup);
        Ok(ticket)
    }

    /// Get a ticket by ID.
    pub fn ticket(&self, id: TicketId) -> Result<Ticket> {
        self.storage.ctx().get_ticket(id)
    }

    /// Public status check by applicant name. Reports the most recent ticket
    /// registered under that name, with queue position while it is waiting.
    pub fn check_status(&self, applicant_name: &str) -> Result<QueueStatusReport> {
        let name = applicant_name.trim();
        let ctx = self.storage.ctx();
        let ticket = ctx
            .latest_ticket_by_name(name)?
            .ok_or_else(|| Error::NotFound(format!("ticket for {name:?}")))?;
        self.status_report(&ctx, ticket)
    }

    fn status_report(&self, ctx: &TxContext<'_>, ticket: Ticket) -> Result<QueueStatusReport> {
        if ticket.status != TicketStatus::Waiting {
            return Ok(QueueStatusReport {
                ticket,
                position: None,
                people_ahead: None,
                estimated_wait_minutes: None,
            });
        }

        let ahead = ctx.count_waiting_ahead(ticket.seq_no)?;
        Ok(QueueStatusReport {
            ticket,
            position: Some(ahead + 1),
            people_ahead: Some(ahead),
            estimated_wait_minutes: Some(ahead * self.settings.minutes_per_ticket),
        })
    }

    /// Cancel a ticket. With `caller_phone`, the ticket must belong to that
    /// phone number; without it the cancel is unrestricted.
    pub fn cancel(&mut self, id: TicketId, caller_phone: Option<&str>) -> Result<Ticket> {
        let _timer = OperationTimer::start("cancel");
        let span = start_operation_span("cancel");
        let now = crate::model::now();
        let caller_phone = caller_phone.map(str::trim);

        let (ticket, from, staff_change) = self.storage.with_transaction(|ctx| {
            let ticket = ctx.get_ticket(id)?;
            if let Some(phone) = caller_phone {
                if ticket.phone != phone {
                    return Err(Error::NotOwner(id));
                }
            }
            cancel_in_tx(ctx, ticket, now)
        })?;

        self.after_cancel(&span, &ticket, from, staff_change);
        Ok(ticket)
    }

    /// Cancel the caller's waiting or in-progress ticket.
    pub fn cancel_by_phone(&mut self, phone: &str) -> Result<Ticket> {
        let _timer = OperationTimer::start("cancel_by_phone");
        let span = start_operation_span("cancel_by_phone");
        let now = crate::model::now();
        let phone = phone.trim();

        let (ticket, from, staff_change) = self.storage.with_transaction(|ctx| {
            let ticket = ctx
                .active_ticket_for_phone(phone)?
                .ok_or_else(|| Error::NotFound(format!("active ticket for phone {phone}")))?;
            cancel_in_tx(ctx, ticket, now)
        })?;

        self.after_cancel(&span, &ticket, from, staff_change);
        Ok(ticket)
    }

    fn after_cancel(
        &self,
        span: &tracing::Span,
        ticket: &Ticket,
        from: TicketStatus,
        staff_change: Option<(StaffStatus, StaffStatus)>,
    ) {
        span.record("ticket.id", display(ticket.id));
        span.record("ticket.seq_no", ticket.seq_no);
        record_state_transition(span, "ticket", from.as_str(), ticket.status.as_str());
        if let Some((from, to)) = staff_change {
            record_state_transition(span, "staff", from.as_str(), to.as_str());
        }
        self.sync_archive(ticket);
    }

    /// Send a waiting ticket to the end of the queue.
    pub fn move_to_back(&mut self, id: TicketId) -> Result<QueueStatusReport> {
        let _timer = OperationTimer::start("move_to_back");
        let now = crate::model::now();

        let (ticket, from_seq) = self.storage.with_transaction(|ctx| {
            let mut ticket = ctx.get_ticket(id)?;
            if ticket.status != TicketStatus::Waiting {
                return Err(Error::Precondition(format!(
                    "ticket {id} is {}; only waiting tickets can move to the back",
                    ticket.status
                )));
            }

            let from_seq = ticket.seq_no;
            ticket.seq_no = ctx.max_seq_no()?.unwrap_or(0) + 1;
            ticket.updated_at = now;
            ctx.update_ticket(&ticket)?;

            ctx.record_event(EventKind::TicketMovedBack {
                id,
                from_seq,
                to_seq: ticket.seq_no,
            })?;
            Ok((ticket, from_seq))
        })?;

        tracing::info!(ticket_id = %id, from_seq, to_seq = ticket.seq_no, "ticket moved to back");
        self.sync_archive(&ticket);
        self.status_report(&self.storage.ctx(), ticket)
    }

    /// Apply an administrative partial update.
    ///
    /// Status may only be set to waiting, paused, or cancelled here; calls and
    /// completions go through the staff operations.
    pub fn update(&mut self, id: TicketId, update: TicketUpdate) -> Result<Ticket> {
        let _timer = OperationTimer::start("update");
        let span = start_operation_span("update");
        if update.is_empty() {
            return Err(Error::Validation("nothing to update".into()));
        }
        if let Some(to) = update.status {
            if !matches!(
                to,
                TicketStatus::Waiting | TicketStatus::Paused | TicketStatus::Cancelled
            ) {
                return Err(Error::Validation(format!(
                    "status {to} cannot be set directly; use call-next or complete"
                )));
            }
        }
        let now = crate::model::now();

        let (ticket, from, staff_change) = self.storage.with_transaction(|ctx| {
            let mut ticket = ctx.get_ticket(id)?;
            let from = ticket.status;

            if let Some(name) = update.full_name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::Validation("applicant name is required".into()));
                }
                ticket.full_name = name.to_string();
            }
            if let Some(phone) = update.phone {
                let phone = phone.trim();
                if phone.is_empty() {
                    return Err(Error::Validation("phone number is required".into()));
                }
                ticket.phone = phone.to_string();
            }
            if let Some(programs) = update.programs {
                let programs: Vec<String> = programs
                    .into_iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect();
                if programs.is_empty() {
                    return Err(Error::Validation("at least one program is required".into()));
                }
                ticket.programs = programs;
            }
            if let Some(notes) = update.notes {
                ticket.notes = Some(notes).filter(|n| !n.trim().is_empty());
            }
            if let Some(language) = update.language {
                ticket.language = Some(language.trim().to_lowercase()).filter(|l| !l.is_empty());
            }

            let to = update.status.unwrap_or(from);
            if to != from && !from.can_transition_to(to) {
                return Err(Error::InvalidTransition {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }

            if to.is_active() {
                if let Some(other) = ctx.active_ticket_for_phone(&ticket.phone)? {
                    if other.id != ticket.id {
                        return Err(Error::DuplicateActiveTicket {
                            phone: ticket.phone,
                        });
                    }
                }
            }

            ticket.updated_at = now;
            if to == TicketStatus::Cancelled && from != to {
                let (ticket, _, staff_change) = cancel_in_tx(ctx, ticket, now)?;
                return Ok((ticket, from, staff_change));
            }

            ticket.status = to;
            ctx.update_ticket(&ticket)?;
            ctx.record_event(EventKind::TicketUpdated {
                id,
                status: ticket.status,
            })?;
            Ok((ticket, from, None))
        })?;

        span.record("ticket.id", display(ticket.id));
        span.record("ticket.seq_no", ticket.seq_no);
        if from != ticket.status {
            record_state_transition(&span, "ticket", from.as_str(), ticket.status.as_str());
        }
        if let Some((from, to)) = staff_change {
            record_state_transition(&span, "staff", from.as_str(), to.as_str());
        }
        self.sync_archive(&ticket);
        Ok(ticket)
    }

    /// Remove a ticket from the live queue. Its ledger row is kept and frozen
    /// with the manual reason. In-progress tickets must be completed or
    /// cancelled first.
    pub fn delete_ticket(&mut self, id: TicketId) -> Result<()> {
        let _timer = OperationTimer::start("delete_ticket");
        let now = crate::model::now();

        self.storage.with_transaction(|ctx| {
            let ticket = ctx.get_ticket(id)?;
            if ticket.status == TicketStatus::InProgress {
                return Err(Error::Precondition(format!(
                    "ticket {id} is being served; complete or cancel it first"
                )));
            }
            ctx.archive_for_eviction(&ticket, ArchiveReason::ManualReset, now)?;
            ctx.delete_ticket(id)?;
            ctx.record_event(EventKind::TicketDeleted { id })?;
            Ok(())
        })?;

        tracing::info!(ticket_id = %id, "ticket deleted");
        Ok(())
    }

    /// Administrative listing, in sequence order.
    pub fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let staff_name = filter.staff_name.as_deref().map(str::to_lowercase);
        let applicant = filter.applicant_name.as_deref().map(str::to_lowercase);

        let tickets = self.storage.ctx().list_tickets()?;
        let total = tickets.len();
        let tickets: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| filter.status.is_none_or(|s| t.status == s))
            .filter(|t| filter.date.is_none_or(|d| t.created_at.date_naive() == d))
            .filter(|t| {
                filter
                    .staff_id
                    .is_none_or(|id| t.assigned_staff.as_ref().is_some_and(|s| s.id == id))
            })
            .filter(|t| {
                staff_name.as_deref().is_none_or(|needle| {
                    t.assigned_staff
                        .as_ref()
                        .is_some_and(|s| s.name.to_lowercase().contains(needle))
                })
            })
            .filter(|t| {
                applicant
                    .as_deref()
                    .is_none_or(|needle| t.full_name.to_lowercase().contains(needle))
            })
            .filter(|t| {
                filter
                    .program
                    .as_deref()
                    .is_none_or(|p| self.catalog.matches(&t.programs, p))
            })
            .collect();

        tracing::debug!(total, matched = tickets.len(), "listed tickets");
        Ok(tickets)
    }

    /// The caller's waiting or in-progress ticket, if any.
    pub fn active_by_phone(&self, phone: &str) -> Result<Option<Ticket>> {
        self.storage.ctx().active_ticket_for_phone(phone.trim())
    }

    /// Tickets waiting or being served right now.
    pub fn waiting_count(&self) -> Result<u64> {
        self.storage.ctx().count_active()
    }

    /// Tickets currently being served, for the hall display.
    pub fn now_serving(&self) -> Result<Vec<NowServing>> {
        let serving = self
            .storage
            .ctx()
            .tickets_with_status(TicketStatus::InProgress)?
            .into_iter()
            .map(|t| NowServing {
                ticket_id: t.id,
                seq_no: t.seq_no,
                staff_name: t.assigned_staff.as_ref().map(|s| s.name.clone()),
                desk: t.assigned_staff.and_then(|s| s.desk),
                programs: t.programs,
            })
            .collect();
        Ok(serving)
    }
}

/// Cancel inside an open transaction. Cancelling an in-progress ticket stamps
/// its processing time and frees its staff member if they were busy with it.
///
/// Returns the cancelled ticket, its previous status, and the staff status
/// change if one happened.
pub(super) fn cancel_in_tx(
    ctx: &TxContext<'_>,
    ticket: Ticket,
    now: DateTime<Utc>,
) -> Result<(Ticket, TicketStatus, Option<(StaffStatus, StaffStatus)>)> {
    let from = ticket.status;
    let staff = ticket.assigned_staff.as_ref().map(|s| s.id);
    let ticket = close_ticket(ctx, ticket, TicketStatus::Cancelled, now)?;

    let mut staff_change = None;
    if from == TicketStatus::InProgress {
        if let Some(staff_id) = staff {
            if ctx.get_staff(staff_id)?.status == StaffStatus::Busy {
                staff_change = set_staff_status(ctx, staff_id, StaffStatus::Available, now)?
                    .map(|prev| (prev, StaffStatus::Available));
            }
        }
    }

    ctx.record_event(EventKind::TicketCancelled {
        id: ticket.id,
        from,
    })?;
    Ok((ticket, from, staff_change))
}

/// Move a ticket into a terminal state and persist it. Leaving in-progress
/// stamps the processing duration.
pub(super) fn close_ticket(
    ctx: &TxContext<'_>,
    mut ticket: Ticket,
    to: TicketStatus,
    now: DateTime<Utc>,
) -> Result<Ticket> {
    if !ticket.status.can_transition_to(to) {
        return Err(Error::InvalidTransition {
            from: ticket.status.to_string(),
            to: to.to_string(),
        });
    }

    if ticket.status == TicketStatus::InProgress {
        let secs = ticket
            .started_at
            .map_or(0, |started| (now - started).num_seconds().max(0));
        ticket.processing_secs = Some(secs);
    }
    ticket.status = to;
    ticket.updated_at = now;
    ctx.update_ticket(&ticket)?;
    Ok(ticket)
}

/// Set a staff member's status and log the change as an event. Returns the
/// previous status, or `None` when the status was already `to`.
pub(super) fn set_staff_status(
    ctx: &TxContext<'_>,
    staff: StaffId,
    to: StaffStatus,
    now: DateTime<Utc>,
) -> Result<Option<StaffStatus>> {
    let from = ctx.update_staff_status(staff, to, now)?;
    if from == to {
        return Ok(None);
    }
    ctx.record_event(EventKind::StaffStatusChanged {
        id: staff,
        from,
        to,
    })?;
    Ok(Some(from))
}
