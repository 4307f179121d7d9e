//! Administrative operations: staff roster, numbering resets, archive upkeep.

use chrono::{DateTime, Utc};

use super::Engine;
use crate::capacity::{self, EvictionReport};
use crate::error::{Error, Result};
use crate::model::*;
use crate::telemetry::queue::OperationTimer;

impl Engine {
    // -----------------------------------------------------------------------
    // Staff roster
    // -----------------------------------------------------------------------

    /// Add a staff member. New staff start offline.
    pub fn add_staff(&mut self, name: &str, desk: Option<&str>) -> Result<Staff> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("staff name is required".into()));
        }
        let now = crate::model::now();
        let staff = Staff {
            id: StaffId::new(),
            name: name.to_string(),
            desk: desk.map(str::trim).filter(|d| !d.is_empty()).map(str::to_string),
            status: StaffStatus::Offline,
            created_at: now,
            updated_at: now,
        };

        self.storage.with_transaction(|ctx| ctx.insert_staff(&staff))?;
        tracing::info!(staff_id = %staff.id, name = %staff.name, "staff added");
        Ok(staff)
    }

    pub fn get_staff(&self, id: StaffId) -> Result<Staff> {
        self.storage.ctx().get_staff(id)
    }

    pub fn list_staff(&self) -> Result<Vec<Staff>> {
        self.storage.ctx().list_staff()
    }

    /// Look a staff member up by ID or by exact name.
    pub fn resolve_staff(&self, key: &str) -> Result<Staff> {
        let key = key.trim();
        let ctx = self.storage.ctx();
        if let Ok(id) = uuid::Uuid::parse_str(key) {
            return ctx.get_staff(StaffId(id));
        }

        let mut matches = ctx.staff_by_name(key)?;
        match matches.len() {
            0 => Err(Error::NotFound(format!("staff {key:?}"))),
            1 => Ok(matches.remove(0)),
            n => Err(Error::Validation(format!(
                "{n} staff members are named {key:?}; use an ID"
            ))),
        }
    }

    pub fn set_desk(&mut self, id: StaffId, desk: Option<&str>) -> Result<Staff> {
        let desk = desk.map(str::trim).filter(|d| !d.is_empty());
        let now = crate::model::now();
        let staff = self.storage.with_transaction(|ctx| {
            ctx.update_staff_desk(id, desk, now)?;
            ctx.get_staff(id)
        })?;
        tracing::info!(staff_id = %id, desk = ?staff.desk, "desk changed");
        Ok(staff)
    }

    /// Remove a staff member. Refused while any ticket assigned to them is
    /// unfinished (waiting, paused, or in progress); finished tickets keep
    /// their history without the staff link.
    pub fn remove_staff(&mut self, id: StaffId) -> Result<()> {
        self.storage.with_transaction(|ctx| {
            let staff = ctx.get_staff(id)?;
            let unfinished = ctx.count_unfinished_for_staff(id)?;
            if unfinished > 0 {
                return Err(Error::Precondition(format!(
                    "staff {} still has {unfinished} unfinished tickets",
                    staff.name
                )));
            }
            ctx.delete_staff(id)
        })?;
        tracing::info!(staff_id = %id, "staff removed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Capacity and numbering
    // -----------------------------------------------------------------------

    /// Evict every finished ticket and renumber the rest 1..N, regardless
    /// of how full the queue is.
    pub fn reset_numbering(&mut self) -> Result<EvictionReport> {
        let _timer = OperationTimer::start("reset_numbering");
        let now = crate::model::now();
        let report = self
            .storage
            .with_transaction(|ctx| capacity::manual_reset(ctx, now))?;
        tracing::info!(
            archived = report.archived.len(),
            skipped = report.skipped.len(),
            renumbered = report.renumbered,
            "queue numbering reset"
        );
        Ok(report)
    }

    /// Evict finished tickets last touched before `cutoff`.
    pub fn purge_completed_before(&mut self, cutoff: DateTime<Utc>) -> Result<EvictionReport> {
        let _timer = OperationTimer::start("purge_completed_before");
        let now = crate::model::now();
        let report = self.storage.with_transaction(|ctx| {
            capacity::evict_terminal(ctx, ArchiveReason::AutoCleanup, Some(cutoff), now)
        })?;
        tracing::info!(
            cutoff = %cutoff,
            archived = report.archived.len(),
            skipped = report.skipped.len(),
            renumbered = report.renumbered,
            "finished tickets purged"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Archive ledger
    // -----------------------------------------------------------------------

    /// Write a ledger row for every live ticket that lacks one. Returns the
    /// number of rows written.
    pub fn backfill_archive(&mut self) -> Result<usize> {
        let _timer = OperationTimer::start("backfill_archive");
        let now = crate::model::now();
        let written = self.storage.with_transaction(|ctx| {
            let mut written = 0;
            for ticket in ctx.tickets_missing_from_archive()? {
                if ctx.shadow_archive(&ticket, ArchiveReason::InitialMigration, now)? {
                    written += 1;
                }
            }
            Ok(written)
        })?;
        tracing::info!(written, "archive backfilled");
        Ok(written)
    }

    pub fn archive_statistics(&self) -> Result<ArchiveStatistics> {
        let ctx = self.storage.ctx();
        let counts = ctx.archive_counts()?;
        Ok(ArchiveStatistics {
            total_archived: counts.total,
            by_reason: counts.by_reason,
            by_status: counts.by_status,
            current_queue_size: ctx.count_tickets()? as u64,
            queue_limit: self.settings.capacity,
        })
    }

    /// The ledger row for a ticket, whether or not the ticket is still live.
    pub fn archived(&self, original_id: TicketId) -> Result<Option<ArchivedTicket>> {
        self.storage.ctx().find_archived(original_id)
    }

    /// Most recently archived rows first.
    pub fn list_archive(&self, limit: usize) -> Result<Vec<ArchivedTicket>> {
        self.storage.ctx().list_archive(limit)
    }
}
