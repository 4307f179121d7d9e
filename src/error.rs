//! Error types for deskq.
//!
//! Variants are grouped into caller-facing kinds via [`Error::kind`] so a
//! transport can tell "no humans" apart from "no room" without string matching.

use thiserror::Error;

use crate::model::{StaffStatus, TicketId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("an active ticket already exists for phone {phone}")]
    DuplicateActiveTicket { phone: String },

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("staff {staff} is {status}; must be available to call the next applicant")]
    StaffNotAvailable { staff: String, status: StaffStatus },

    #[error("staff {staff} is {status}; must be busy or paused to complete an applicant")]
    NotServing { staff: String, status: StaffStatus },

    #[error("no in-progress ticket found for staff {0}")]
    NoActiveTicket(String),

    #[error("ticket {0} does not belong to the caller")]
    NotOwner(TicketId),

    #[error("{0}")]
    Precondition(String),

    #[error("no staff available to take a new ticket")]
    NoStaffAvailable,

    #[error("queue is full ({capacity} tickets) and no finished tickets can be evicted")]
    CapacityExhausted { capacity: usize },

    #[error("archive sync failed for ticket {ticket}: {reason}")]
    ArchiveSync { ticket: TicketId, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Caller-facing classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Precondition,
    NoStaffAvailable,
    CapacityExhausted,
    ArchiveSync,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateActiveTicket { .. }
            | Error::InvalidTransition { .. }
            | Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::StaffNotAvailable { .. }
            | Error::NotServing { .. }
            | Error::NoActiveTicket(_)
            | Error::NotOwner(_)
            | Error::Precondition(_) => ErrorKind::Precondition,
            Error::NoStaffAvailable => ErrorKind::NoStaffAvailable,
            Error::CapacityExhausted { .. } => ErrorKind::CapacityExhausted,
            Error::ArchiveSync { .. } => ErrorKind::ArchiveSync,
            Error::Config(_)
            | Error::Storage(_)
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Other(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_and_staff_failures_are_distinct_kinds() {
        assert_eq!(Error::NoStaffAvailable.kind(), ErrorKind::NoStaffAvailable);
        assert_eq!(
            Error::CapacityExhausted { capacity: 99 }.kind(),
            ErrorKind::CapacityExhausted
        );
        assert_ne!(
            Error::NoStaffAvailable.kind(),
            Error::CapacityExhausted { capacity: 99 }.kind()
        );
    }

    #[test]
    fn duplicate_ticket_is_a_validation_error() {
        let err = Error::DuplicateActiveTicket {
            phone: "+77010000000".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("+77010000000"));
    }
}
