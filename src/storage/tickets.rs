//! Entry store: live ticket rows.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::{TxContext, parse_column, parse_optional, parse_programs};
use crate::error::{Error, Result};
use crate::model::*;

const TICKET_SELECT: &str = "SELECT t.id, t.seq_no, t.full_name, t.phone, t.programs, t.status,
        t.staff_id, s.name, s.desk, t.notes, t.language, t.created_at, t.updated_at,
        t.started_at, t.processing_secs
     FROM tickets t LEFT JOIN staff s ON s.id = t.staff_id";

impl TxContext<'_> {
    pub fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.tx.execute(
            "INSERT INTO tickets (
                id, seq_no, full_name, phone, programs, status, staff_id, notes,
                language, created_at, updated_at, started_at, processing_secs
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                ticket.id.to_string(),
                ticket.seq_no,
                ticket.full_name,
                ticket.phone,
                serde_json::to_string(&ticket.programs)?,
                ticket.status.as_str(),
                ticket.assigned_staff.as_ref().map(|s| s.id.to_string()),
                ticket.notes,
                ticket.language,
                timestamp(ticket.created_at),
                timestamp(ticket.updated_at),
                ticket.started_at.map(timestamp),
                ticket.processing_secs,
            ],
        )?;
        Ok(())
    }

    /// Write back every mutable column of a ticket.
    pub fn update_ticket(&self, ticket: &Ticket) -> Result<()> {
        let changed = self.tx.execute(
            "UPDATE tickets SET seq_no = ?1, full_name = ?2, phone = ?3, programs = ?4,
                status = ?5, staff_id = ?6, notes = ?7, language = ?8, updated_at = ?9,
                started_at = ?10, processing_secs = ?11
             WHERE id = ?12",
            params![
                ticket.seq_no,
                ticket.full_name,
                ticket.phone,
                serde_json::to_string(&ticket.programs)?,
                ticket.status.as_str(),
                ticket.assigned_staff.as_ref().map(|s| s.id.to_string()),
                ticket.notes,
                ticket.language,
                timestamp(ticket.updated_at),
                ticket.started_at.map(timestamp),
                ticket.processing_secs,
                ticket.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("ticket {}", ticket.id)));
        }
        Ok(())
    }

    pub fn delete_ticket(&self, id: TicketId) -> Result<()> {
        let changed = self
            .tx
            .execute("DELETE FROM tickets WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("ticket {id}")));
        }
        Ok(())
    }

    pub fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        self.query_one(
            &format!("{TICKET_SELECT} WHERE t.id = ?1"),
            params![id.to_string()],
        )
    }

    pub fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        self.find_ticket(id)?
            .ok_or_else(|| Error::NotFound(format!("ticket {id}")))
    }

    pub fn count_tickets(&self) -> Result<usize> {
        let n: i64 = self
            .tx
            .query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Tickets currently waiting or being served.
    pub fn count_active(&self) -> Result<u64> {
        let n: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM tickets WHERE status IN ('waiting', 'in_progress')",
            [],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    pub fn max_seq_no(&self) -> Result<Option<i64>> {
        let max: Option<i64> = self
            .tx
            .query_row("SELECT MAX(seq_no) FROM tickets", [], |row| row.get(0))?;
        Ok(max)
    }

    pub fn active_ticket_for_phone(&self, phone: &str) -> Result<Option<Ticket>> {
        self.query_one(
            &format!(
                "{TICKET_SELECT} WHERE t.phone = ?1 AND t.status IN ('waiting', 'in_progress')"
            ),
            params![phone],
        )
    }

    /// Most recently created ticket for an applicant name.
    pub fn latest_ticket_by_name(&self, full_name: &str) -> Result<Option<Ticket>> {
        self.query_one(
            &format!(
                "{TICKET_SELECT} WHERE t.full_name = ?1 ORDER BY t.created_at DESC, t.seq_no DESC LIMIT 1"
            ),
            params![full_name],
        )
    }

    /// Lowest-numbered waiting ticket assigned to a staff member.
    pub fn next_waiting_for_staff(&self, staff: StaffId) -> Result<Option<Ticket>> {
        self.query_one(
            &format!(
                "{TICKET_SELECT} WHERE t.staff_id = ?1 AND t.status = 'waiting' ORDER BY t.seq_no ASC LIMIT 1"
            ),
            params![staff.to_string()],
        )
    }

    pub fn in_progress_for_staff(&self, staff: StaffId) -> Result<Option<Ticket>> {
        self.query_one(
            &format!("{TICKET_SELECT} WHERE t.staff_id = ?1 AND t.status = 'in_progress'"),
            params![staff.to_string()],
        )
    }

    /// Waiting tickets numbered below `seq_no`, across all staff.
    pub fn count_waiting_ahead(&self, seq_no: i64) -> Result<u32> {
        let n: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM tickets WHERE status = 'waiting' AND seq_no < ?1",
            params![seq_no],
            |row| row.get(0),
        )?;
        Ok(n as u32)
    }

    pub fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.query_many(&format!("{TICKET_SELECT} ORDER BY t.seq_no ASC"), [])
    }

    pub fn tickets_for_staff(
        &self,
        staff: StaffId,
        status: Option<TicketStatus>,
    ) -> Result<Vec<Ticket>> {
        self.query_many(
            &format!(
                "{TICKET_SELECT} WHERE t.staff_id = ?1 AND (?2 IS NULL OR t.status = ?2)
                 ORDER BY t.seq_no ASC"
            ),
            params![staff.to_string(), status.map(TicketStatus::as_str)],
        )
    }

    pub fn tickets_with_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        self.query_many(
            &format!("{TICKET_SELECT} WHERE t.status = ?1 ORDER BY t.seq_no ASC"),
            params![status.as_str()],
        )
    }

    /// Completed and cancelled tickets, least recently updated first.
    /// With `updated_before`, only those last touched before the cutoff.
    pub fn terminal_tickets_oldest_first(
        &self,
        updated_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Ticket>> {
        self.query_many(
            &format!(
                "{TICKET_SELECT} WHERE t.status IN ('completed', 'cancelled')
                 AND (?1 IS NULL OR t.updated_at < ?1)
                 ORDER BY t.updated_at ASC, t.seq_no ASC"
            ),
            params![updated_before.map(timestamp)],
        )
    }

    /// Rewrite every live ticket's sequence number to 1..N in creation order.
    ///
    /// Numbers are first negated so the unique index never sees a collision
    /// between an old and a new number mid-rewrite.
    pub fn renumber_by_creation(&self) -> Result<usize> {
        self.tx.execute("UPDATE tickets SET seq_no = -seq_no", [])?;

        let ids: Vec<String> = {
            let mut stmt = self
                .tx
                .prepare("SELECT id FROM tickets ORDER BY created_at ASC, seq_no DESC")?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let mut stmt = self
            .tx
            .prepare("UPDATE tickets SET seq_no = ?1 WHERE id = ?2")?;
        for (i, id) in ids.iter().enumerate() {
            stmt.execute(params![(i + 1) as i64, id])?;
        }

        Ok(ids.len())
    }

    fn query_one<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Option<Ticket>> {
        Ok(self
            .tx
            .query_row(sql, params, ticket_from_row)
            .optional()?)
    }

    fn query_many<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Ticket>> {
        let mut stmt = self.tx.prepare(sql)?;
        let tickets = stmt
            .query_map(params, ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tickets)
    }
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let staff_id: Option<uuid::Uuid> = parse_optional(row, 6)?;
    let staff_name: Option<String> = row.get(7)?;

    let assigned_staff = match (staff_id, staff_name) {
        (Some(id), Some(name)) => Some(StaffRef {
            id: StaffId(id),
            name,
            desk: row.get(8)?,
        }),
        _ => None,
    };

    Ok(Ticket {
        id: TicketId(parse_column(row, 0)?),
        seq_no: row.get(1)?,
        full_name: row.get(2)?,
        phone: row.get(3)?,
        programs: parse_programs(row, 4)?,
        status: parse_column(row, 5)?,
        assigned_staff,
        notes: row.get(9)?,
        language: row.get(10)?,
        created_at: parse_column(row, 11)?,
        updated_at: parse_column(row, 12)?,
        started_at: parse_optional(row, 13)?,
        processing_secs: row.get(14)?,
    })
}
