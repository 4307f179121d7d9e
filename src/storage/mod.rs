//! SQLite storage layer.
//!
//! Single source of truth for live tickets, staff, the archive ledger, and the
//! event stream. WAL mode lets several processes share one database file; every
//! core operation runs inside one `IMMEDIATE` transaction so writers serialize
//! on the database lock before they read anything they intend to change.

mod archive;
mod staff;
mod tickets;

use std::str::FromStr;
use std::time::Duration;

use rusqlite::types::Type;
use rusqlite::{Connection, Row, TransactionBehavior, params};

use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::model::{now, timestamp};

pub use staff::Workload;

/// How long a writer waits for another process to release the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Storage backend. Owns the SQLite connection.
pub struct Storage {
    conn: Connection,
}

/// Handle for performing storage operations within a transaction.
///
/// The engine receives one of these per operation and never holds it across
/// external I/O. Reads outside a transaction use the same type over the
/// auto-commit connection.
pub(crate) struct TxContext<'a> {
    tx: &'a Connection,
}

impl Storage {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let mut storage = Self { conn };
        storage.init()?;
        Ok(storage)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut storage = Self { conn };
        storage.init()?;
        Ok(storage)
    }

    fn init(&mut self) -> Result<()> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        self.conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS staff (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                desk            TEXT,
                status          TEXT NOT NULL DEFAULT 'offline',
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tickets (
                id              TEXT PRIMARY KEY,
                seq_no          INTEGER NOT NULL,
                full_name       TEXT NOT NULL,
                phone           TEXT NOT NULL,
                programs        TEXT NOT NULL DEFAULT '[]',
                status          TEXT NOT NULL,
                staff_id        TEXT REFERENCES staff(id) ON DELETE SET NULL,
                notes           TEXT,
                language        TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                started_at      TEXT,
                processing_secs INTEGER
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_seq ON tickets(seq_no);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_active_phone ON tickets(phone)
                WHERE status IN ('waiting', 'in_progress');
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_serving ON tickets(staff_id)
                WHERE status = 'in_progress';
            CREATE INDEX IF NOT EXISTS idx_tickets_staff ON tickets(staff_id, status, seq_no);
            CREATE INDEX IF NOT EXISTS idx_tickets_created ON tickets(created_at);

            CREATE TABLE IF NOT EXISTS archived_tickets (
                id              TEXT PRIMARY KEY,
                original_id     TEXT NOT NULL UNIQUE,
                seq_no          INTEGER NOT NULL,
                full_name       TEXT NOT NULL,
                phone           TEXT NOT NULL,
                programs        TEXT NOT NULL DEFAULT '[]',
                status          TEXT NOT NULL,
                staff_id        TEXT,
                staff_name      TEXT,
                notes           TEXT,
                language        TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT,
                started_at      TEXT,
                completed_at    TEXT,
                processing_secs INTEGER,
                archived_at     TEXT NOT NULL,
                archive_reason  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_archive_reason ON archived_tickets(archive_reason);
            CREATE INDEX IF NOT EXISTS idx_archive_archived_at ON archived_tickets(archived_at);

            CREATE TABLE IF NOT EXISTS events (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                kind        TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Execute a closure within an `IMMEDIATE` SQLite transaction.
    ///
    /// The write lock is taken at `BEGIN`, so the closure's reads are
    /// consistent with its writes. Commits if the closure returns Ok, rolls
    /// back on Err.
    pub(crate) fn with_transaction<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TxContext) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ctx = TxContext { tx: &tx };
        let result = f(&mut ctx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Context over the auto-commit connection, for reads and best-effort writes.
    pub(crate) fn ctx(&self) -> TxContext<'_> {
        TxContext { tx: &self.conn }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Get events since a sequence number.
    pub fn get_events_since(&self, since_seq: u64) -> Result<Vec<Event>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, timestamp, kind FROM events WHERE seq > ?1 ORDER BY seq ASC")?;

        let events = stmt
            .query_map(params![since_seq as i64], |row| {
                let kind_str: String = row.get(2)?;
                Ok(Event {
                    seq: row.get::<_, i64>(0)? as u64,
                    timestamp: parse_column(row, 1)?,
                    kind: serde_json::from_str(&kind_str)
                        .unwrap_or(EventKind::Unknown { raw: kind_str }),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(events)
    }
}

impl TxContext<'_> {
    pub fn record_event(&self, kind: EventKind) -> Result<Event> {
        let now = now();

        self.tx.execute(
            "INSERT INTO events (timestamp, kind) VALUES (?1, ?2)",
            params![timestamp(now), serde_json::to_string(&kind)?],
        )?;

        Ok(Event {
            seq: self.tx.last_insert_rowid() as u64,
            timestamp: now,
            kind,
        })
    }

    /// Run `f` inside a savepoint. On error the savepoint is rolled back and
    /// the error returned; the enclosing transaction stays usable.
    pub fn savepoint<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.tx.execute_batch("SAVEPOINT deskq_step")?;
        match f(self) {
            Ok(value) => {
                self.tx.execute_batch("RELEASE deskq_step")?;
                Ok(value)
            }
            Err(e) => {
                self.tx
                    .execute_batch("ROLLBACK TO deskq_step; RELEASE deskq_step")?;
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

/// Read a text column and parse it, surfacing parse failures as rusqlite
/// conversion errors so they flow through `query_map`.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_optional<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        s.parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub(crate) fn parse_programs(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
