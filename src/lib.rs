//! # deskq
//!
//! Queue engine for an in-person admissions office.
//!
//! Applicants register and are assigned to the least-loaded staff member,
//! wait, get called to a desk, and are served to completion. The live queue
//! is capped; finished tickets are moved to a permanent archive ledger and
//! the survivors renumbered when room is needed. State lives in SQLite and
//! every operation is one transaction, so several front ends can share a
//! database file.

pub mod announce;
pub mod balancer;
pub mod capacity;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod model;
pub mod programs;
pub mod storage;
pub mod telemetry;

pub use engine::{CallOutcome, Engine, QueueSettings};
pub use error::{Error, ErrorKind, Result};
