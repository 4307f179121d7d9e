//! Archive ledger: one permanent row per ticket ever registered.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::{TxContext, parse_column, parse_optional, parse_programs};
use crate::error::Result;
use crate::model::*;

const ARCHIVE_SELECT: &str = "SELECT id, original_id, seq_no, full_name, phone, programs, status,
        staff_id, staff_name, notes, language, created_at, updated_at, started_at,
        completed_at, processing_secs, archived_at, archive_reason
     FROM archived_tickets";

/// Totals over the whole ledger.
#[derive(Debug, Clone, Default)]
pub(crate) struct ArchiveCounts {
    pub total: u64,
    pub by_reason: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
}

impl TxContext<'_> {
    /// Write the ledger row for a ticket unless one exists already.
    /// Returns whether a row was written.
    pub fn shadow_archive(
        &self,
        ticket: &Ticket,
        reason: ArchiveReason,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let row = ArchivedTicket::snapshot(ticket, reason, now);
        let written = self.tx.execute(
            "INSERT INTO archived_tickets (
                id, original_id, seq_no, full_name, phone, programs, status, staff_id,
                staff_name, notes, language, created_at, updated_at, started_at,
                completed_at, processing_secs, archived_at, archive_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            ON CONFLICT(original_id) DO NOTHING",
            params![
                row.id.to_string(),
                row.original_id.to_string(),
                row.seq_no,
                row.full_name,
                row.phone,
                serde_json::to_string(&row.programs)?,
                row.status.as_str(),
                row.staff_id.map(|s| s.to_string()),
                row.staff_name,
                row.notes,
                row.language,
                timestamp(row.created_at),
                row.updated_at.map(timestamp),
                row.started_at.map(timestamp),
                row.completed_at.map(timestamp),
                row.processing_secs,
                timestamp(row.archived_at),
                row.archive_reason.as_str(),
            ],
        )?;
        Ok(written > 0)
    }

    /// Record a ticket's final state before its live row is deleted.
    ///
    /// Creates the ledger row if it is missing, otherwise overwrites every
    /// field with the ticket's final values and stamps the eviction reason.
    /// A staff link lost to staff removal keeps the last recorded staff.
    pub fn archive_for_eviction(
        &self,
        ticket: &Ticket,
        reason: ArchiveReason,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let row = ArchivedTicket::snapshot(ticket, reason, now);
        self.tx.execute(
            "INSERT INTO archived_tickets (
                id, original_id, seq_no, full_name, phone, programs, status, staff_id,
                staff_name, notes, language, created_at, updated_at, started_at,
                completed_at, processing_secs, archived_at, archive_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            ON CONFLICT(original_id) DO UPDATE SET
                seq_no = excluded.seq_no,
                full_name = excluded.full_name,
                phone = excluded.phone,
                programs = excluded.programs,
                status = excluded.status,
                staff_id = COALESCE(excluded.staff_id, staff_id),
                staff_name = COALESCE(excluded.staff_name, staff_name),
                notes = excluded.notes,
                language = excluded.language,
                updated_at = excluded.updated_at,
                started_at = excluded.started_at,
                completed_at = excluded.completed_at,
                processing_secs = excluded.processing_secs,
                archived_at = excluded.archived_at,
                archive_reason = excluded.archive_reason",
            params![
                row.id.to_string(),
                row.original_id.to_string(),
                row.seq_no,
                row.full_name,
                row.phone,
                serde_json::to_string(&row.programs)?,
                row.status.as_str(),
                row.staff_id.map(|s| s.to_string()),
                row.staff_name,
                row.notes,
                row.language,
                timestamp(row.created_at),
                row.updated_at.map(timestamp),
                row.started_at.map(timestamp),
                row.completed_at.map(timestamp),
                row.processing_secs,
                timestamp(row.archived_at),
                row.archive_reason.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Mirror a live ticket's current state into its ledger row.
    ///
    /// Frozen rows (already evicted) are left alone, and a ticket whose staff
    /// member was removed keeps the staff recorded earlier. Returns the number of
    /// rows touched: 0 when the ticket has no ledger row or it is frozen.
    pub fn sync_archive(&self, ticket: &Ticket) -> Result<usize> {
        let completed_at =
            (ticket.status == TicketStatus::Completed).then_some(ticket.updated_at);
        let changed = self.tx.execute(
            "UPDATE archived_tickets SET
                seq_no = ?1, full_name = ?2, phone = ?3, programs = ?4, status = ?5,
                staff_id = COALESCE(?6, staff_id), staff_name = COALESCE(?7, staff_name),
                notes = ?8, language = ?9,
                updated_at = ?10, started_at = ?11,
                completed_at = COALESCE(?12, completed_at),
                processing_secs = ?13
             WHERE original_id = ?14
               AND archive_reason NOT IN ('auto_cleanup', 'manual_reset')",
            params![
                ticket.seq_no,
                ticket.full_name,
                ticket.phone,
                serde_json::to_string(&ticket.programs)?,
                ticket.status.as_str(),
                ticket.assigned_staff.as_ref().map(|s| s.id.to_string()),
                ticket.assigned_staff.as_ref().map(|s| s.name.clone()),
                ticket.notes,
                ticket.language,
                timestamp(ticket.updated_at),
                ticket.started_at.map(timestamp),
                completed_at.map(timestamp),
                ticket.processing_secs,
                ticket.id.to_string(),
            ],
        )?;
        Ok(changed)
    }

    pub fn find_archived(&self, original_id: TicketId) -> Result<Option<ArchivedTicket>> {
        Ok(self
            .tx
            .query_row(
                &format!("{ARCHIVE_SELECT} WHERE original_id = ?1"),
                params![original_id.to_string()],
                archived_from_row,
            )
            .optional()?)
    }

    /// Most recently archived rows first.
    pub fn list_archive(&self, limit: usize) -> Result<Vec<ArchivedTicket>> {
        let mut stmt = self.tx.prepare(&format!(
            "{ARCHIVE_SELECT} ORDER BY archived_at DESC, seq_no DESC LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map(params![limit as i64], archived_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Live tickets with no ledger row yet.
    pub fn tickets_missing_from_archive(&self) -> Result<Vec<Ticket>> {
        let ids: Vec<String> = {
            let mut stmt = self.tx.prepare(
                "SELECT t.id FROM tickets t
                 WHERE NOT EXISTS (SELECT 1 FROM archived_tickets a WHERE a.original_id = t.id)
                 ORDER BY t.seq_no ASC",
            )?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let mut tickets = Vec::with_capacity(ids.len());
        for id in ids {
            let id: TicketId = id.parse()?;
            tickets.push(self.get_ticket(id)?);
        }
        Ok(tickets)
    }

    pub(crate) fn archive_counts(&self) -> Result<ArchiveCounts> {
        let mut counts = ArchiveCounts::default();

        counts.total = self.tx.query_row(
            "SELECT COUNT(*) FROM archived_tickets",
            [],
            |row| row.get::<_, i64>(0),
        )? as u64;

        for (column, into) in [
            ("archive_reason", &mut counts.by_reason),
            ("status", &mut counts.by_status),
        ] {
            let mut stmt = self.tx.prepare(&format!(
                "SELECT {column}, COUNT(*) FROM archived_tickets GROUP BY {column}"
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?;
            for row in rows {
                let (key, n) = row?;
                into.insert(key, n);
            }
        }

        Ok(counts)
    }
}

fn archived_from_row(row: &Row<'_>) -> rusqlite::Result<ArchivedTicket> {
    Ok(ArchivedTicket {
        id: parse_column(row, 0)?,
        original_id: TicketId(parse_column(row, 1)?),
        seq_no: row.get(2)?,
        full_name: row.get(3)?,
        phone: row.get(4)?,
        programs: parse_programs(row, 5)?,
        status: parse_column(row, 6)?,
        staff_id: parse_optional(row, 7)?.map(StaffId),
        staff_name: row.get(8)?,
        notes: row.get(9)?,
        language: row.get(10)?,
        created_at: parse_column(row, 11)?,
        updated_at: parse_optional(row, 12)?,
        started_at: parse_optional(row, 13)?,
        completed_at: parse_optional(row, 14)?,
        processing_secs: row.get(15)?,
        archived_at: parse_column(row, 16)?,
        archive_reason: parse_column(row, 17)?,
    })
}
