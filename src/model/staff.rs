//! Staff members who serve the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    /// Physical service point, announced to applicants.
    pub desk: Option<String>,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    pub fn to_ref(&self) -> StaffRef {
        StaffRef {
            id: self.id,
            name: self.name.clone(),
            desk: self.desk.clone(),
        }
    }
}

/// Display projection of a staff member attached to a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRef {
    pub id: StaffId,
    pub name: String,
    pub desk: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(pub Uuid);

impl StaffId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StaffId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Work status of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    /// At the desk and free to call the next applicant.
    Available,
    /// Serving an applicant.
    Busy,
    /// On a break. May still hold an in-progress ticket.
    Paused,
    /// Not working.
    Offline,
}

impl StaffStatus {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: StaffStatus) -> bool {
        use StaffStatus::*;
        matches!(
            (self, to),
            (Offline, Available)
                | (Available, Busy)
                | (Busy, Available)
                | (Available, Paused)
                | (Busy, Paused)    // pause mid-service
                | (Paused, Available)
                | (Paused, Busy)    // resume with a ticket still in progress
                | (Available, Offline)
                | (Busy, Offline)
                | (Paused, Offline)
        )
    }

    /// Eligible to receive newly registered tickets.
    pub fn takes_new_tickets(self) -> bool {
        matches!(self, StaffStatus::Available | StaffStatus::Busy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StaffStatus::Available => "available",
            StaffStatus::Busy => "busy",
            StaffStatus::Paused => "paused",
            StaffStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StaffStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(StaffStatus::Available),
            "busy" => Ok(StaffStatus::Busy),
            "paused" => Ok(StaffStatus::Paused),
            "offline" => Ok(StaffStatus::Offline),
            _ => Err(Error::Validation(format!("unknown staff status: {s}"))),
        }
    }
}
