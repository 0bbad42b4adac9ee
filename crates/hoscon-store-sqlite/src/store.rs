//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::{Path, PathBuf};

use hoscon_core::{
  department::{Department, DepartmentStatus},
  export,
  ids::{StaffId, TaskId},
  incident::{INITIAL_TASK_TITLE, Incident, NewIncident, Task, TaskStatus},
  staff::{NewStaff, Staff, StaffUpdate},
  store::{RecordStore, Snapshot},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    DEPARTMENT_COLUMNS, RawDepartment, RawIncident, RawStaff, RawTask, STAFF_COLUMNS,
    TASK_COLUMNS, encode_dt, now, select_departments, select_incidents, select_staff,
    select_tasks,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A situational record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// connection closes when the last clone is dropped.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Snapshot the store and write the export artifacts into `dir`.
  ///
  /// Returns the names of the files produced.
  pub async fn export_all(&self, dir: impl Into<PathBuf>) -> Result<Vec<String>> {
    let dir = dir.into();
    let snapshot = self.snapshot().await?;
    let names =
      tokio::task::spawn_blocking(move || export::write_snapshot(&snapshot, &dir)).await??;
    Ok(names)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Departments ───────────────────────────────────────────────────────────

  async fn seed_departments(&self, names: Vec<String>) -> Result<usize> {
    let status = DepartmentStatus::default().to_string();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO departments (name, status, notes) VALUES (?1, ?2, '')",
          )?;
          for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            inserted += stmt.execute(rusqlite::params![name, status])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    tracing::info!(inserted, "seeded departments");
    Ok(inserted)
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let raws = self.conn.call(|conn| Ok(select_departments(conn)?)).await?;
    tracing::debug!(rows = raws.len(), "listed departments");
    raws.into_iter().map(RawDepartment::into_department).collect()
  }

  async fn update_department(
    &self,
    name: String,
    status: DepartmentStatus,
    notes: String,
  ) -> Result<Department> {
    let status_str = status.to_string();
    let name_arg = name.clone();

    let raw: Option<RawDepartment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE departments SET status = ?1, notes = ?2 WHERE name = ?3
                 RETURNING {DEPARTMENT_COLUMNS}"
              ),
              rusqlite::params![status_str, notes, name_arg],
              RawDepartment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else {
      return Err(hoscon_core::Error::DepartmentNotFound(name).into());
    };
    let department = raw.into_department()?;
    tracing::info!(department = %department.name, status = %department.status, "updated department");
    Ok(department)
  }

  // ── Staff ─────────────────────────────────────────────────────────────────

  async fn list_staff(&self) -> Result<Vec<Staff>> {
    let raws = self.conn.call(|conn| Ok(select_staff(conn)?)).await?;
    tracing::debug!(rows = raws.len(), "listed staff");
    raws.into_iter().map(RawStaff::into_staff).collect()
  }

  async fn find_staff_by_name(&self, name: String) -> Result<Option<Staff>> {
    // Names are stored trimmed; see `NewStaff::validated`.
    let name = name.trim().to_owned();

    let raw: Option<RawStaff> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STAFF_COLUMNS} FROM staff WHERE name = ?1"),
              rusqlite::params![name],
              RawStaff::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStaff::into_staff).transpose()
  }

  async fn register_staff(&self, input: NewStaff) -> Result<Staff> {
    let input = input.validated()?;
    let (name, role, department_id) =
      (input.name.clone(), input.role.clone(), input.department_id.0);

    // `None` means the name was already taken; nothing was written.
    let new_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM staff WHERE name = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO staff (name, role, department_id, present) VALUES (?1, ?2, ?3, 0)",
          rusqlite::params![name, role, department_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    let Some(id) = new_id else {
      tracing::warn!(name = %input.name, "rejected duplicate staff registration");
      return Err(hoscon_core::Error::DuplicateName(input.name).into());
    };

    let staff = Staff {
      id:            StaffId(id),
      name:          input.name,
      role:          input.role,
      department_id: Some(input.department_id),
      present:       false,
    };
    tracing::info!(staff_id = %staff.id, name = %staff.name, "registered staff");
    Ok(staff)
  }

  async fn update_staff(&self, id: StaffId, update: StaffUpdate) -> Result<Staff> {
    let raw: Option<RawStaff> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE staff SET role = ?1, department_id = ?2, present = ?3 WHERE id = ?4
                 RETURNING {STAFF_COLUMNS}"
              ),
              rusqlite::params![update.role, update.department_id.0, update.present, id.0],
              RawStaff::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    let staff = raw
      .ok_or(hoscon_core::Error::StaffNotFound(id))?
      .into_staff()?;
    tracing::info!(staff_id = %staff.id, present = staff.present, "updated staff");
    Ok(staff)
  }

  // ── Incidents & tasks ─────────────────────────────────────────────────────

  async fn log_incident(&self, input: NewIncident) -> Result<(Incident, Task)> {
    let timestamp = now();
    let ts_str = encode_dt(timestamp);
    let open = TaskStatus::Open.to_string();
    let (kind, description, assigned_to) = (
      input.kind.clone(),
      input.description.clone(),
      input.assigned_to.map(|s| s.0),
    );

    let (incident_id, task_id) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO incidents (type, description, timestamp) VALUES (?1, ?2, ?3)",
          rusqlite::params![kind, description, ts_str],
        )?;
        let incident_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO tasks (incident_id, title, assigned_to, status, timestamp)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![incident_id, INITIAL_TASK_TITLE, assigned_to, open, ts_str],
        )?;
        let task_id = tx.last_insert_rowid();

        tx.commit()?;
        Ok((incident_id, task_id))
      })
      .await?;

    let incident = Incident {
      id: incident_id.into(),
      kind: input.kind,
      description: input.description,
      timestamp,
    };
    let task = Task {
      id: task_id.into(),
      incident_id: incident.id,
      title: INITIAL_TASK_TITLE.to_owned(),
      assigned_to: input.assigned_to,
      status: TaskStatus::Open,
      timestamp,
    };

    tracing::info!(
      incident_id = %incident.id,
      task_id = %task.id,
      kind = %incident.kind,
      assigned_to = ?task.assigned_to.map(|s| s.0),
      "logged incident"
    );
    Ok((incident, task))
  }

  async fn list_incidents(&self) -> Result<Vec<Incident>> {
    let raws = self.conn.call(|conn| Ok(select_incidents(conn)?)).await?;
    tracing::debug!(rows = raws.len(), "listed incidents");
    raws.into_iter().map(RawIncident::into_incident).collect()
  }

  async fn list_tasks(&self) -> Result<Vec<Task>> {
    let raws = self.conn.call(|conn| Ok(select_tasks(conn)?)).await?;
    tracing::debug!(rows = raws.len(), "listed tasks");
    raws.into_iter().map(RawTask::into_task).collect()
  }

  async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> Result<Task> {
    let status_str = status.to_string();
    let ts_str = encode_dt(now());

    // MAX() keeps the timestamp monotonic if the wall clock steps back.
    let raw: Option<RawTask> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE tasks SET status = ?1, timestamp = MAX(timestamp, ?2) WHERE id = ?3
                 RETURNING {TASK_COLUMNS}"
              ),
              rusqlite::params![status_str, ts_str, id.0],
              RawTask::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    let task = raw.ok_or(hoscon_core::Error::TaskNotFound(id))?.into_task()?;
    tracing::info!(task_id = %task.id, status = %task.status, "updated task status");
    Ok(task)
  }

  // ── Export ────────────────────────────────────────────────────────────────

  async fn snapshot(&self) -> Result<Snapshot> {
    let (departments, staff, incidents, tasks) = self
      .conn
      .call(|conn| {
        // One read transaction so the four tables agree with each other.
        let tx = conn.transaction()?;
        let rows = (
          select_departments(&tx)?,
          select_staff(&tx)?,
          select_incidents(&tx)?,
          select_tasks(&tx)?,
        );
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    Ok(Snapshot {
      departments: departments
        .into_iter()
        .map(RawDepartment::into_department)
        .collect::<Result<_>>()?,
      staff:       staff.into_iter().map(RawStaff::into_staff).collect::<Result<_>>()?,
      incidents:   incidents
        .into_iter()
        .map(RawIncident::into_incident)
        .collect::<Result<_>>()?,
      tasks:       tasks.into_iter().map(RawTask::into_task).collect::<Result<_>>()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn failed_task_insert_rolls_back_the_incident() {
    let s = SqliteStore::open_in_memory().await.unwrap();
    s.conn
      .call(|conn| {
        conn.execute_batch(
          "CREATE TRIGGER reject_tasks BEFORE INSERT ON tasks
           BEGIN SELECT RAISE(ABORT, 'tasks unavailable'); END;",
        )?;
        Ok(())
      })
      .await
      .unwrap();

    let err = s
      .log_incident(NewIncident::new("Fire", "Kitchen fire"))
      .await
      .unwrap_err();
    assert!(matches!(err, crate::Error::Database(_)));
    assert!(s.list_incidents().await.unwrap().is_empty());
    assert!(s.list_tasks().await.unwrap().is_empty());

    // Once tasks can be written again, the pair is committed together.
    s.conn
      .call(|conn| {
        conn.execute_batch("DROP TRIGGER reject_tasks;")?;
        Ok(())
      })
      .await
      .unwrap();
    let (incident, task) = s
      .log_incident(NewIncident::new("Fire", "Kitchen fire"))
      .await
      .unwrap();
    assert_eq!(s.list_incidents().await.unwrap(), vec![incident.clone()]);
    assert_eq!(s.list_tasks().await.unwrap()[0].incident_id, incident.id);
    assert_eq!(task.incident_id, incident.id);
  }
}
