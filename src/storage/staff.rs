//! Staff rows and workload snapshots.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::{TxContext, parse_column};
use crate::error::{Error, Result};
use crate::model::*;

const STAFF_SELECT: &str = "SELECT id, name, desk, status, created_at, updated_at FROM staff";

/// A staff member and the number of waiting or in-progress tickets assigned to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    pub staff: StaffRef,
    pub status: StaffStatus,
    pub active: u32,
}

impl TxContext<'_> {
    pub fn insert_staff(&self, staff: &Staff) -> Result<()> {
        self.tx.execute(
            "INSERT INTO staff (id, name, desk, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                staff.id.to_string(),
                staff.name,
                staff.desk,
                staff.status.as_str(),
                timestamp(staff.created_at),
                timestamp(staff.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_staff(&self, id: StaffId) -> Result<Option<Staff>> {
        Ok(self
            .tx
            .query_row(
                &format!("{STAFF_SELECT} WHERE id = ?1"),
                params![id.to_string()],
                staff_from_row,
            )
            .optional()?)
    }

    pub fn get_staff(&self, id: StaffId) -> Result<Staff> {
        self.find_staff(id)?
            .ok_or_else(|| Error::NotFound(format!("staff {id}")))
    }

    pub fn staff_by_name(&self, name: &str) -> Result<Vec<Staff>> {
        let mut stmt = self
            .tx
            .prepare(&format!("{STAFF_SELECT} WHERE name = ?1 ORDER BY created_at"))?;
        let staff = stmt
            .query_map(params![name], staff_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(staff)
    }

    pub fn list_staff(&self) -> Result<Vec<Staff>> {
        let mut stmt = self
            .tx
            .prepare(&format!("{STAFF_SELECT} ORDER BY name, created_at"))?;
        let staff = stmt
            .query_map([], staff_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(staff)
    }

    /// Set a staff member's status. Returns the previous status.
    ///
    /// Validates the transition against the current stored status, not a
    /// caller-supplied snapshot.
    pub fn update_staff_status(
        &self,
        id: StaffId,
        to: StaffStatus,
        now: DateTime<Utc>,
    ) -> Result<StaffStatus> {
        let from = self.get_staff(id)?.status;
        if from != to && !from.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.tx.execute(
            "UPDATE staff SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![to.as_str(), timestamp(now), id.to_string()],
        )?;
        Ok(from)
    }

    pub fn update_staff_desk(
        &self,
        id: StaffId,
        desk: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let changed = self.tx.execute(
            "UPDATE staff SET desk = ?1, updated_at = ?2 WHERE id = ?3",
            params![desk, timestamp(now), id.to_string()],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("staff {id}")));
        }
        Ok(())
    }

    pub fn delete_staff(&self, id: StaffId) -> Result<()> {
        let changed = self
            .tx
            .execute("DELETE FROM staff WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("staff {id}")));
        }
        Ok(())
    }

    /// Tickets assigned to a staff member that are not yet completed or
    /// cancelled, paused ones included.
    pub fn count_unfinished_for_staff(&self, id: StaffId) -> Result<u32> {
        let n: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM tickets
             WHERE staff_id = ?1 AND status NOT IN ('completed', 'cancelled')",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(n as u32)
    }

    /// Every staff member with their current workload, in name order.
    /// Eligibility is left to the balancer.
    pub fn workloads(&self) -> Result<Vec<Workload>> {
        let mut stmt = self.tx.prepare(
            "SELECT s.id, s.name, s.desk, s.status,
                (SELECT COUNT(*) FROM tickets t
                 WHERE t.staff_id = s.id AND t.status IN ('waiting', 'in_progress'))
             FROM staff s
             ORDER BY s.name, s.created_at",
        )?;

        let workloads = stmt
            .query_map([], |row| {
                Ok(Workload {
                    staff: StaffRef {
                        id: StaffId(parse_column(row, 0)?),
                        name: row.get(1)?,
                        desk: row.get(2)?,
                    },
                    status: parse_column(row, 3)?,
                    active: row.get::<_, i64>(4)? as u32,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(workloads)
    }
}

fn staff_from_row(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: StaffId(parse_column(row, 0)?),
        name: row.get(1)?,
        desk: row.get(2)?,
        status: parse_column(row, 3)?,
        created_at: parse_column(row, 4)?,
        updated_at: parse_column(row, 5)?,
    })
}
