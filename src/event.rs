//! Structured events appended on every committed queue transition.
//!
//! Events are written inside the same transaction as the change they describe,
//! so a consumer reading `events_since` never sees a transition that rolled back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ArchiveReason, StaffId, StaffStatus, TicketId, TicketStatus};

/// A structured event recorded by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence number. Consumers can detect gaps.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    TicketRegistered {
        id: TicketId,
        seq_no: i64,
        staff_id: StaffId,
    },
    TicketCalled {
        id: TicketId,
        seq_no: i64,
        staff_id: StaffId,
    },
    TicketCompleted {
        id: TicketId,
        staff_id: Option<StaffId>,
        processing_secs: Option<i64>,
        forced: bool,
    },
    TicketCancelled {
        id: TicketId,
        from: TicketStatus,
    },
    TicketMovedBack {
        id: TicketId,
        from_seq: i64,
        to_seq: i64,
    },
    TicketUpdated {
        id: TicketId,
        status: TicketStatus,
    },
    TicketDeleted {
        id: TicketId,
    },
    TicketsEvicted {
        reason: ArchiveReason,
        archived: usize,
        skipped: usize,
    },
    QueueRenumbered {
        tickets: usize,
    },
    StaffStatusChanged {
        id: StaffId,
        from: StaffStatus,
        to: StaffStatus,
    },
    /// Forward compatibility: a row this build cannot parse.
    #[serde(skip_deserializing)]
    Unknown {
        raw: String,
    },
}
