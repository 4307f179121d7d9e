//! Capacity guard: keeps the live ticket table under its ceiling.
//!
//! Finished tickets (completed or cancelled) are archived and deleted oldest
//! first, then every surviving ticket is renumbered 1..N by creation time.
//! All of this runs inside the caller's transaction.

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::model::{ArchiveReason, TicketId};
use crate::storage::TxContext;
use crate::telemetry::metrics;

/// Outcome of one eviction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvictionReport {
    /// Tickets archived and removed from the live table.
    pub archived: Vec<TicketId>,
    /// Tickets whose eviction failed; they stay live.
    pub skipped: Vec<TicketId>,
    /// Live tickets renumbered afterwards.
    pub renumbered: usize,
}

/// Make room for one more ticket.
///
/// Below capacity this does nothing and returns `None`. At capacity every
/// finished ticket is evicted and the queue renumbered. Fails with
/// `CapacityExhausted` if there was nothing to evict or the table is still
/// full afterwards.
pub(crate) fn ensure_room_for_new_ticket(
    ctx: &TxContext<'_>,
    capacity: usize,
    now: DateTime<Utc>,
) -> Result<Option<EvictionReport>> {
    let count = ctx.count_tickets()?;
    if count < capacity {
        return Ok(None);
    }

    tracing::info!(count, capacity, "queue at capacity, evicting finished tickets");
    let report = evict_terminal(ctx, ArchiveReason::AutoCleanup, None, now)?;

    if report.archived.is_empty() {
        tracing::warn!(
            count,
            capacity,
            skipped = report.skipped.len(),
            "queue full and no finished ticket could be evicted"
        );
        return Err(Error::CapacityExhausted { capacity });
    }
    if ctx.count_tickets()? >= capacity {
        tracing::warn!(capacity, "queue still full after eviction");
        return Err(Error::CapacityExhausted { capacity });
    }

    Ok(Some(report))
}

/// Archive and delete finished tickets, oldest update first, then renumber
/// the survivors.
///
/// With `updated_before`, only tickets last touched before the cutoff are
/// considered. A ticket that fails to archive or delete is rolled back on
/// its own and skipped; the rest of the batch carries on.
pub(crate) fn evict_terminal(
    ctx: &TxContext<'_>,
    reason: ArchiveReason,
    updated_before: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<EvictionReport> {
    let candidates = ctx.terminal_tickets_oldest_first(updated_before)?;
    let mut report = EvictionReport::default();

    for ticket in &candidates {
        let evicted = ctx.savepoint(|ctx| {
            ctx.archive_for_eviction(ticket, reason, now)?;
            ctx.delete_ticket(ticket.id)
        });

        match evicted {
            Ok(()) => report.archived.push(ticket.id),
            Err(e) => {
                tracing::warn!(
                    ticket_id = %ticket.id,
                    seq_no = ticket.seq_no,
                    reason = %reason,
                    error = %e,
                    "skipping ticket that failed to evict"
                );
                report.skipped.push(ticket.id);
            }
        }
    }

    let evicted = metrics::tickets_evicted();
    for (result, n) in [
        ("archived", report.archived.len()),
        ("skipped", report.skipped.len()),
    ] {
        if n > 0 {
            evicted.add(
                n as u64,
                &[
                    KeyValue::new("reason", reason.as_str()),
                    KeyValue::new("result", result),
                ],
            );
        }
    }

    if !candidates.is_empty() {
        ctx.record_event(EventKind::TicketsEvicted {
            reason,
            archived: report.archived.len(),
            skipped: report.skipped.len(),
        })?;
    }

    if !report.archived.is_empty() {
        report.renumbered = renumber(ctx)?;
    }

    tracing::info!(
        reason = %reason,
        archived = report.archived.len(),
        skipped = report.skipped.len(),
        renumbered = report.renumbered,
        "eviction pass finished"
    );
    Ok(report)
}

/// Rewrite every live ticket's sequence number to 1..N in creation order.
pub(crate) fn renumber(ctx: &TxContext<'_>) -> Result<usize> {
    let n = ctx.renumber_by_creation()?;
    ctx.record_event(EventKind::QueueRenumbered { tickets: n })?;
    tracing::debug!(tickets = n, "queue renumbered");
    Ok(n)
}

/// Administrative reset: evict every finished ticket regardless of current
/// size and renumber the rest.
pub(crate) fn manual_reset(ctx: &TxContext<'_>, now: DateTime<Utc>) -> Result<EvictionReport> {
    let mut report = evict_terminal(ctx, ArchiveReason::ManualReset, None, now)?;
    if report.archived.is_empty() {
        report.renumbered = renumber(ctx)?;
    }
    Ok(report)
}
