//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so lexical order in SQL matches chronological order. Statuses
//! are stored as their display strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use hoscon_core::{
  department::{Department, DepartmentStatus},
  ids::{DepartmentId, IncidentId, StaffId, TaskId},
  incident::{Incident, Task, TaskStatus},
  staff::Staff,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store persists.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const DEPARTMENT_COLUMNS: &str = "id, name, status, notes";
pub const STAFF_COLUMNS: &str = "id, name, role, department_id, present";
pub const INCIDENT_COLUMNS: &str = "id, type, description, timestamp";
pub const TASK_COLUMNS: &str =
  "id, incident_id, title, assigned_to, status, timestamp";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `departments` row.
pub struct RawDepartment {
  pub id:     i64,
  pub name:   String,
  pub status: String,
  pub notes:  String,
}

impl RawDepartment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:     row.get(0)?,
      name:   row.get(1)?,
      status: row.get(2)?,
      notes:  row.get(3)?,
    })
  }

  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      id:     DepartmentId(self.id),
      name:   self.name,
      status: DepartmentStatus::decode(&self.status)?,
      notes:  self.notes,
    })
  }
}

/// Raw values read directly from a `staff` row.
pub struct RawStaff {
  pub id:            i64,
  pub name:          String,
  pub role:          String,
  pub department_id: Option<i64>,
  pub present:       bool,
}

impl RawStaff {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      role:          row.get(2)?,
      department_id: row.get(3)?,
      present:       row.get(4)?,
    })
  }

  pub fn into_staff(self) -> Result<Staff> {
    Ok(Staff {
      id:            StaffId(self.id),
      name:          self.name,
      role:          self.role,
      department_id: self.department_id.map(DepartmentId),
      present:       self.present,
    })
  }
}

/// Raw values read directly from an `incidents` row.
pub struct RawIncident {
  pub id:          i64,
  pub kind:        String,
  pub description: String,
  pub timestamp:   String,
}

impl RawIncident {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      kind:        row.get(1)?,
      description: row.get(2)?,
      timestamp:   row.get(3)?,
    })
  }

  pub fn into_incident(self) -> Result<Incident> {
    Ok(Incident {
      id:          IncidentId(self.id),
      kind:        self.kind,
      description: self.description,
      timestamp:   decode_dt(&self.timestamp)?,
    })
  }
}

/// Raw values read directly from a `tasks` row.
pub struct RawTask {
  pub id:          i64,
  pub incident_id: i64,
  pub title:       String,
  pub assigned_to: Option<i64>,
  pub status:      String,
  pub timestamp:   String,
}

impl RawTask {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      incident_id: row.get(1)?,
      title:       row.get(2)?,
      assigned_to: row.get(3)?,
      status:      row.get(4)?,
      timestamp:   row.get(5)?,
    })
  }

  pub fn into_task(self) -> Result<Task> {
    Ok(Task {
      id:          TaskId(self.id),
      incident_id: IncidentId(self.incident_id),
      title:       self.title,
      assigned_to: self.assigned_to.map(StaffId),
      status:      TaskStatus::decode(&self.status)?,
      timestamp:   decode_dt(&self.timestamp)?,
    })
  }
}

// ─── Full-table reads ────────────────────────────────────────────────────────

/// Run `SELECT <columns> FROM <table> ORDER BY id` and map each row.
fn select_all<T>(
  conn: &rusqlite::Connection,
  columns: &str,
  table: &str,
  map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(&format!("SELECT {columns} FROM {table} ORDER BY id"))?;
  let rows = stmt
    .query_map([], map)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn select_departments(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawDepartment>> {
  select_all(conn, DEPARTMENT_COLUMNS, "departments", RawDepartment::from_row)
}

pub fn select_staff(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawStaff>> {
  select_all(conn, STAFF_COLUMNS, "staff", RawStaff::from_row)
}

pub fn select_incidents(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawIncident>> {
  select_all(conn, INCIDENT_COLUMNS, "incidents", RawIncident::from_row)
}

pub fn select_tasks(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawTask>> {
  select_all(conn, TASK_COLUMNS, "tasks", RawTask::from_row)
}
