//! Archive ledger rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StaffId, Ticket, TicketId, TicketStatus};
use crate::error::{Error, Result};

/// Permanent copy of a ticket. Written when the ticket is registered and kept
/// in sync with it until the live row is evicted, after which it is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedTicket {
    pub id: Uuid,
    /// The live ticket this row mirrors. The live row may no longer exist.
    pub original_id: TicketId,
    pub seq_no: i64,
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    pub status: TicketStatus,
    pub staff_id: Option<StaffId>,
    /// Staff name at the time of the last sync.
    pub staff_name: Option<String>,
    pub notes: Option<String>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    /// Set only when the ticket reached `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    pub processing_secs: Option<i64>,
    pub archived_at: DateTime<Utc>,
    pub archive_reason: ArchiveReason,
}

impl ArchivedTicket {
    /// Copy a live ticket into a new ledger row.
    ///
    /// `updated_at` stays `None` until the ticket has been changed at least
    /// once after creation, so a fresh shadow row records no update even
    /// though the live ticket's `updated_at` equals its `created_at`.
    pub fn snapshot(ticket: &Ticket, reason: ArchiveReason, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_id: ticket.id,
            seq_no: ticket.seq_no,
            full_name: ticket.full_name.clone(),
            phone: ticket.phone.clone(),
            programs: ticket.programs.clone(),
            status: ticket.status,
            staff_id: ticket.assigned_staff.as_ref().map(|s| s.id),
            staff_name: ticket.assigned_staff.as_ref().map(|s| s.name.clone()),
            notes: ticket.notes.clone(),
            language: ticket.language.clone(),
            created_at: ticket.created_at,
            updated_at: (ticket.updated_at != ticket.created_at).then_some(ticket.updated_at),
            started_at: ticket.started_at,
            completed_at: (ticket.status == TicketStatus::Completed).then_some(ticket.updated_at),
            processing_secs: ticket.processing_secs,
            archived_at: now,
            archive_reason: reason,
        }
    }

    /// The live ticket has been evicted; nothing updates this row any more.
    pub fn is_frozen(&self) -> bool {
        self.archive_reason.is_eviction()
    }
}

/// Why an archive row was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveReason {
    /// Shadow copy written at registration.
    AutoBackup,
    /// Evicted by the capacity guard or an age-based purge.
    AutoCleanup,
    /// Evicted by an administrative numbering reset.
    ManualReset,
    /// Backfilled for a ticket that predates the ledger.
    InitialMigration,
}

impl ArchiveReason {
    /// Eviction reasons are final: the live ticket is gone.
    pub fn is_eviction(self) -> bool {
        matches!(self, ArchiveReason::AutoCleanup | ArchiveReason::ManualReset)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveReason::AutoBackup => "auto_backup",
            ArchiveReason::AutoCleanup => "auto_cleanup",
            ArchiveReason::ManualReset => "manual_reset",
            ArchiveReason::InitialMigration => "initial_migration",
        }
    }
}

impl std::fmt::Display for ArchiveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArchiveReason {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto_backup" => Ok(ArchiveReason::AutoBackup),
            "auto_cleanup" => Ok(ArchiveReason::AutoCleanup),
            "manual_reset" => Ok(ArchiveReason::ManualReset),
            "initial_migration" => Ok(ArchiveReason::InitialMigration),
            _ => Err(Error::Validation(format!("unknown archive reason: {s}"))),
        }
    }
}

/// Ledger totals for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveStatistics {
    pub total_archived: u64,
    pub by_reason: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
    pub current_queue_size: u64,
    pub queue_limit: usize,
}
