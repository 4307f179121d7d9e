//! Tickets: the live rows of the queue.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::staff::StaffRef;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// An applicant's queue record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,

    /// Display and ordering number. Unique among live tickets only; the
    /// capacity guard rewrites it to 1..N after evictions.
    pub seq_no: i64,

    pub full_name: String,
    pub phone: String,

    /// Requested program codes, in the order the applicant picked them.
    pub programs: Vec<String>,

    pub status: TicketStatus,

    /// Staff member serving this ticket. Name and desk are a read-time
    /// projection of the staff table.
    pub assigned_staff: Option<StaffRef>,

    pub notes: Option<String>,

    /// Language the applicant registered in ("ru", "kk", "en").
    pub language: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// When a staff member called this ticket.
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds between the call and completion.
    pub processing_secs: Option<i64>,
}

/// Newtype for ticket IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub Uuid);

impl TicketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TicketId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::Validation(format!("bad ticket id {s:?}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Registered, waiting to be called.
    Waiting,
    /// Called by its staff member and being served.
    InProgress,
    /// Set aside by an explicit update; not callable until back to waiting.
    Paused,
    /// Served to completion. Terminal.
    Completed,
    /// Withdrawn by the applicant or staff. Terminal.
    Cancelled,
}

impl TicketStatus {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, to),
            (Waiting, InProgress)
                | (Waiting, Paused)
                | (Paused, Waiting)
                | (InProgress, Completed)
                | (Waiting, Cancelled)
                | (Paused, Cancelled)
                | (InProgress, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::Cancelled)
    }

    /// Counts toward workload and the one-ticket-per-phone rule.
    pub fn is_active(self) -> bool {
        matches!(self, TicketStatus::Waiting | TicketStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Paused => "paused",
            TicketStatus::Completed => "completed",
            TicketStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "waiting" => Ok(TicketStatus::Waiting),
            "in_progress" => Ok(TicketStatus::InProgress),
            "paused" => Ok(TicketStatus::Paused),
            "completed" => Ok(TicketStatus::Completed),
            "cancelled" => Ok(TicketStatus::Cancelled),
            _ => Err(Error::Validation(format!("unknown ticket status: {s}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Applicant data for a new ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub(crate) full_name: String,
    pub(crate) phone: String,
    pub(crate) programs: Vec<String>,
    pub(crate) notes: Option<String>,
    pub(crate) language: Option<String>,
}

impl NewTicket {
    pub fn new(full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            phone: phone.into(),
            programs: Vec::new(),
            notes: None,
            language: None,
        }
    }

    pub fn program(mut self, code: impl Into<String>) -> Self {
        self.programs.push(code.into());
        self
    }

    pub fn programs<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.programs.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes = Some(note.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Trim fields and reject empty names, phones, or program lists.
    pub(crate) fn normalized(mut self) -> Result<Self> {
        self.full_name = self.full_name.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.programs = self
            .programs
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        self.notes = self.notes.filter(|n| !n.trim().is_empty());
        self.language = self.language.map(|l| l.trim().to_lowercase());

        if self.full_name.is_empty() {
            return Err(Error::Validation("applicant name is required".into()));
        }
        if self.phone.is_empty() {
            return Err(Error::Validation("phone number is required".into()));
        }
        if self.programs.is_empty() {
            return Err(Error::Validation("at least one program is required".into()));
        }
        Ok(self)
    }
}

/// Partial update applied by staff or administrators.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub programs: Option<Vec<String>>,
    pub notes: Option<String>,
    pub language: Option<String>,
    pub status: Option<TicketStatus>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.programs.is_none()
            && self.notes.is_none()
            && self.language.is_none()
            && self.status.is_none()
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Where an applicant stands, as reported to the public status check.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatusReport {
    pub ticket: Ticket,
    /// 1-based place among waiting tickets. Only set while waiting.
    pub position: Option<u32>,
    pub people_ahead: Option<u32>,
    pub estimated_wait_minutes: Option<u32>,
}

/// Administrative listing filters. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    /// Calendar day (UTC) the ticket was created on.
    pub date: Option<NaiveDate>,
    pub staff_id: Option<super::StaffId>,
    /// Case-insensitive substring of the assigned staff name.
    pub staff_name: Option<String>,
    /// Case-insensitive substring of the applicant name.
    pub applicant_name: Option<String>,
    /// Program code or human-entered program name in any catalog language.
    pub program: Option<String>,
}

/// A called ticket as shown on the public display board.
#[derive(Debug, Clone, Serialize)]
pub struct NowServing {
    pub ticket_id: TicketId,
    pub seq_no: i64,
    pub staff_name: Option<String>,
    pub desk: Option<String>,
    pub programs: Vec<String>,
}
