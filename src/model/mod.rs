//! Core data model.
//!
//! A ticket is one applicant's place in the queue. It is assigned to a staff
//! member at registration, called, served, and eventually evicted into the
//! archive ledger, which keeps a copy of every ticket ever created.

pub mod archive;
pub mod staff;
pub mod ticket;

pub use archive::*;
pub use staff::*;
pub use ticket::*;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Fixed-width RFC 3339 rendering used for every stored timestamp.
///
/// Microsecond precision with a `Z` suffix keeps text order equal to time order,
/// which the eviction and renumbering queries rely on.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at storage precision, so values handed back to callers
/// compare equal to what a later read returns.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexicographically() {
        let early = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let late = early + chrono::Duration::microseconds(500_001);
        assert!(timestamp(early) < timestamp(late));
        assert_eq!(timestamp(early).len(), timestamp(late).len());
    }

    #[test]
    fn now_survives_a_storage_round_trip() {
        let at = now();
        let parsed: DateTime<Utc> = timestamp(at).parse().unwrap();
        assert_eq!(parsed, at);
    }
}
