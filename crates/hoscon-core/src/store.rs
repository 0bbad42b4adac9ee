//! The `RecordStore` trait and the export snapshot type.
//!
//! The trait is implemented by storage backends (e.g. `hoscon-store-sqlite`).
//! The command-line front end depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  department::{Department, DepartmentStatus},
  ids::{StaffId, TaskId},
  incident::{Incident, NewIncident, Task, TaskStatus},
  staff::{NewStaff, Staff, StaffUpdate},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Full contents of all four tables, read at a single point in time.
///
/// Field order is the order of entries in the exported `bundle.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub departments: Vec<Department>,
  pub staff:       Vec<Staff>,
  pub incidents:   Vec<Incident>,
  pub tasks:       Vec<Task>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the situational record store.
///
/// Every method runs to completion (commit or failure) before its future
/// resolves; writes are durable once it does. List methods return rows in
/// identifier order.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Departments ───────────────────────────────────────────────────────

  /// Insert each named department (status Green, empty notes) unless one
  /// with that name already exists. Returns the number of rows inserted.
  fn seed_departments(
    &self,
    names: Vec<String>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Overwrite the status and notes of the department called `name`.
  ///
  /// Fails with a not-found error if no department has that name.
  fn update_department(
    &self,
    name: String,
    status: DepartmentStatus,
    notes: String,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  // ── Staff ─────────────────────────────────────────────────────────────

  fn list_staff(
    &self,
  ) -> impl Future<Output = Result<Vec<Staff>, Self::Error>> + Send + '_;

  /// Look up a staff member by exact name.
  fn find_staff_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Staff>, Self::Error>> + Send + '_;

  /// Add a staff member to the roster, initially not present.
  ///
  /// Fails with a duplicate-name error, leaving the roster unchanged, if the
  /// name is already taken.
  fn register_staff(
    &self,
    input: NewStaff,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  /// Overwrite role, department and presence of an existing staff member.
  /// The department id is not checked.
  fn update_staff(
    &self,
    id: StaffId,
    update: StaffUpdate,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  // ── Incidents & tasks ─────────────────────────────────────────────────

  /// Record an incident together with its "Initial Response" task.
  ///
  /// Both rows are committed together or not at all and share one
  /// store-assigned timestamp.
  fn log_incident(
    &self,
    input: NewIncident,
  ) -> impl Future<Output = Result<(Incident, Task), Self::Error>> + Send + '_;

  fn list_incidents(
    &self,
  ) -> impl Future<Output = Result<Vec<Incident>, Self::Error>> + Send + '_;

  fn list_tasks(
    &self,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;

  /// Set a task's status and refresh its timestamp to the current time.
  /// The timestamp never moves backwards.
  fn update_task_status(
    &self,
    id: TaskId,
    status: TaskStatus,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  // ── Export ────────────────────────────────────────────────────────────

  /// Read all four tables in one consistent view.
  fn snapshot(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;
}
