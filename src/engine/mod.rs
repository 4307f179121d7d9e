//! Core engine. The public API for registering and serving applicants.
//!
//! The engine owns the storage, the balancer's randomness, and the announcer.
//! Every state transition goes through here and runs as one storage
//! transaction; archive mirroring and announcements happen after commit.

mod admin;
mod staff;
mod tickets;

use opentelemetry::KeyValue;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::announce::{Announcement, Announcer, TracingAnnouncer};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::model::*;
use crate::programs::ProgramCatalog;
use crate::storage::Storage;
use crate::telemetry::metrics;

/// Queue-wide knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    /// Most live tickets the queue holds before evicting finished ones.
    pub capacity: usize,
    /// Assumed service time per applicant, for wait estimates.
    pub minutes_per_ticket: u32,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: 99,
            minutes_per_ticket: 5,
        }
    }
}

/// What happened when staff asked for the next applicant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallOutcome {
    /// A waiting ticket was called and is now in progress.
    Called {
        ticket: Ticket,
        announcement: Announcement,
    },
    /// Nothing assigned to this staff member is waiting.
    EmptyQueue,
}

/// The queue engine. Owns all state and enforces all invariants.
pub struct Engine {
    storage: Storage,
    rng: Box<dyn RngCore + Send>,
    settings: QueueSettings,
    announcer: Box<dyn Announcer>,
    catalog: ProgramCatalog,
}

impl Engine {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            rng: Box::new(StdRng::from_entropy()),
            settings: QueueSettings::default(),
            announcer: Box::new(TracingAnnouncer),
            catalog: ProgramCatalog::builtin(),
        }
    }

    /// Create an engine with in-memory storage (for testing).
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Storage::in_memory()?))
    }

    /// Create an engine backed by a file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(Storage::open(path)?))
    }

    /// Open the configured database with the configured settings and catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = match &config.program_catalog {
            Some(path) => ProgramCatalog::load(path)?,
            None => ProgramCatalog::builtin(),
        };
        Ok(Self::open(&config.database_path)?
            .with_settings(config.queue_settings())
            .with_catalog(catalog))
    }

    pub fn with_settings(mut self, settings: QueueSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the balancer's randomness source, e.g. with a seeded RNG.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_announcer(mut self, announcer: impl Announcer + 'static) -> Self {
        self.announcer = Box::new(announcer);
        self
    }

    pub fn with_catalog(mut self, catalog: ProgramCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn settings(&self) -> QueueSettings {
        self.settings
    }

    /// Get events since a sequence number.
    pub fn events_since(&self, since_seq: u64) -> Result<Vec<Event>> {
        self.storage.get_events_since(since_seq)
    }

    // -----------------------------------------------------------------------
    // After-commit side effects
    // -----------------------------------------------------------------------

    /// Write the registration-time ledger row. Failures are logged only.
    fn shadow_archive(&self, ticket: &Ticket, reason: ArchiveReason) {
        if let Err(e) = self
            .storage
            .ctx()
            .shadow_archive(ticket, reason, crate::model::now())
        {
            report_archive_failure(ticket.id, "shadow", e);
        }
    }

    /// Mirror a committed change into the ledger. Failures are logged only.
    fn sync_archive(&self, ticket: &Ticket) {
        match self.storage.ctx().sync_archive(ticket) {
            Ok(0) => tracing::debug!(ticket_id = %ticket.id, "no mutable archive row to sync"),
            Ok(_) => {}
            Err(e) => report_archive_failure(ticket.id, "sync", e),
        }
    }

    fn announce(&self, announcement: &Announcement) {
        if let Err(e) = self.announcer.announce(announcement) {
            tracing::warn!(
                seq_no = announcement.seq_no,
                error = %e,
                "announcement failed; the call stands"
            );
        }
    }
}

fn report_archive_failure(ticket: TicketId, operation: &'static str, source: Error) {
    let err = Error::ArchiveSync {
        ticket,
        reason: source.to_string(),
    };
    tracing::warn!(operation, error = %err, "archive write failed after commit");
    metrics::archive_sync_failures().add(1, &[KeyValue::new("operation", operation)]);
}
