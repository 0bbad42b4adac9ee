//! Subcommand definitions and handlers. Each handler maps one operator
//! action onto one or two store operations and prints the result.

use std::{fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context as _, anyhow};
use clap::Subcommand;
use hoscon_core::{
  department::{Department, DepartmentStatus},
  ids::{DepartmentId, StaffId, TaskId},
  incident::{Incident, NewIncident, Task, TaskStatus},
  staff::{NewStaff, Staff, StaffUpdate},
  store::RecordStore,
};
use hoscon_store_sqlite::SqliteStore;
use serde::Serialize;
use strum::IntoEnumIterator;

// ─── Argument types ───────────────────────────────────────────────────────────

/// Parse a status enum case-insensitively, listing the valid values on error.
fn parse_status<T>(s: &str) -> Result<T, String>
where
  T: FromStr + IntoEnumIterator + Display,
{
  s.parse().map_err(|_| {
    let valid: Vec<String> = T::iter().map(|v| v.to_string()).collect();
    format!("expected one of: {}", valid.join(", "))
  })
}

#[derive(Subcommand, Debug)]
pub enum DepartmentCommand {
  /// Set a department's status and notes.
  Update {
    /// Department name, as shown on the dashboard.
    name:   String,
    #[arg(long, value_parser = parse_status::<DepartmentStatus>)]
    status: DepartmentStatus,
    #[arg(long, default_value = "")]
    notes:  String,
  },
}

#[derive(Subcommand, Debug)]
pub enum StaffCommand {
  /// List the roster.
  List,
  /// Register a new staff member (initially not present).
  Register {
    name:       String,
    #[arg(long)]
    role:       String,
    /// Department id, from the dashboard.
    #[arg(long)]
    department: i64,
  },
  /// Change role, department or presence. Omitted fields keep their values.
  Update {
    name:       String,
    #[arg(long)]
    role:       Option<String>,
    #[arg(long)]
    department: Option<i64>,
    /// Mark as checked in.
    #[arg(long, conflicts_with = "absent")]
    present:    bool,
    /// Mark as not checked in.
    #[arg(long)]
    absent:     bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum IncidentCommand {
  /// Log an incident and open its initial response task.
  Log {
    #[arg(long = "type")]
    kind:        String,
    #[arg(long)]
    description: String,
    /// Staff member for the initial task; defaults to the first on the
    /// roster.
    #[arg(long)]
    assign:      Option<String>,
  },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
  /// Set a task's status.
  Update {
    id:     i64,
    #[arg(long, value_parser = parse_status::<TaskStatus>)]
    status: TaskStatus,
  },
}

// ─── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Output {
  pub json: bool,
}

impl Output {
  fn list<T: Serialize>(
    self,
    heading: &str,
    rows: &[T],
    line: fn(&T) -> String,
  ) -> anyhow::Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(rows)?);
      return Ok(());
    }
    println!("{heading}");
    for row in rows {
      println!("{}", line(row));
    }
    Ok(())
  }
}

fn department_line(d: &Department) -> String {
  format!("{:>4}  {:<20} {:<7} {}", d.id, d.name, d.status, d.notes)
}

fn staff_line(s: &Staff) -> String {
  let department = s.department_id.map(|d| d.to_string()).unwrap_or_default();
  let present = if s.present { "present" } else { "absent" };
  format!("{:>4}  {:<24} {:<20} {:>4}  {present}", s.id, s.name, s.role, department)
}

fn incident_line(i: &Incident) -> String {
  format!("{:>4}  {}  {:<16} {}", i.id, i.timestamp.to_rfc3339(), i.kind, i.description)
}

fn task_line(t: &Task) -> String {
  let assignee = t.assigned_to.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
  format!(
    "{:>4}  {:>8}  {:<18} {:>8}  {:<12} {}",
    t.id,
    t.incident_id,
    t.title,
    assignee,
    t.status,
    t.timestamp.to_rfc3339()
  )
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

pub async fn dashboard<S: RecordStore>(store: &S, out: Output) -> anyhow::Result<()> {
  let departments = store.list_departments().await?;
  out.list("  ID  NAME                 STATUS  NOTES", &departments, department_line)
}

pub async fn department<S: RecordStore>(
  store: &S,
  cmd: DepartmentCommand,
) -> anyhow::Result<()> {
  let DepartmentCommand::Update { name, status, notes } = cmd;
  let department = store.update_department(name, status, notes).await?;
  println!("Updated {} → {}", department.name, department.status);
  Ok(())
}

pub async fn staff<S: RecordStore>(
  store: &S,
  cmd: StaffCommand,
  out: Output,
) -> anyhow::Result<()> {
  match cmd {
    StaffCommand::List => {
      let roster = store.list_staff().await?;
      out.list(
        "  ID  NAME                     ROLE                 DEPT  PRESENCE",
        &roster,
        staff_line,
      )
    }
    StaffCommand::Register { name, role, department } => {
      let staff = store
        .register_staff(NewStaff::new(name, role, DepartmentId(department)))
        .await?;
      println!("Staff member {} added (id {}).", staff.name, staff.id);
      Ok(())
    }
    StaffCommand::Update { name, role, department, present, absent } => {
      let current = store
        .find_staff_by_name(name.clone())
        .await?
        .ok_or_else(|| anyhow!("no staff member named {name:?}"))?;
      let presence = match (present, absent) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
      };
      let update = merge_staff_update(&current, role, department, presence)?;
      let staff = store.update_staff(current.id, update).await?;
      println!("Staff member {} updated.", staff.name);
      Ok(())
    }
  }
}

/// Build a full update from the fields the operator supplied, keeping the
/// current value of everything else.
fn merge_staff_update(
  current: &Staff,
  role: Option<String>,
  department: Option<i64>,
  present: Option<bool>,
) -> anyhow::Result<StaffUpdate> {
  let department_id = match department {
    Some(id) => DepartmentId(id),
    None => current
      .department_id
      .with_context(|| format!("{} has no department; pass --department", current.name))?,
  };
  Ok(StaffUpdate {
    role: role.unwrap_or_else(|| current.role.clone()),
    department_id,
    present: present.unwrap_or(current.present),
  })
}

pub async fn incident<S: RecordStore>(
  store: &S,
  cmd: IncidentCommand,
) -> anyhow::Result<()> {
  let IncidentCommand::Log { kind, description, assign } = cmd;
  let assignee = resolve_assignee(store, assign).await?;

  let mut input = NewIncident::new(kind, description);
  if let Some(staff_id) = assignee {
    input = input.assigned_to(staff_id);
  }
  let (incident, task) = store.log_incident(input).await?;
  println!("Incident {} logged; task {} opened.", incident.id, task.id);
  Ok(())
}

/// Resolve the assignee for a new incident's task: the named staff member,
/// or the first on the roster, or nobody if the roster is empty.
async fn resolve_assignee<S: RecordStore>(
  store: &S,
  name: Option<String>,
) -> anyhow::Result<Option<StaffId>> {
  match name {
    Some(name) => {
      let staff = store
        .find_staff_by_name(name.clone())
        .await?
        .ok_or_else(|| anyhow!("no staff member named {name:?}"))?;
      Ok(Some(staff.id))
    }
    None => Ok(store.list_staff().await?.first().map(|s| s.id)),
  }
}

pub async fn incidents<S: RecordStore>(store: &S, out: Output) -> anyhow::Result<()> {
  let incidents = store.list_incidents().await?;
  let tasks = store.list_tasks().await?;
  if out.json {
    let both = serde_json::json!({ "incidents": incidents, "tasks": tasks });
    println!("{}", serde_json::to_string_pretty(&both)?);
    return Ok(());
  }
  let plain = Output { json: false };
  plain.list(
    "  ID  TIMESTAMP                         TYPE             DESCRIPTION",
    &incidents,
    incident_line,
  )?;
  println!();
  plain.list(
    "  ID  INCIDENT  TITLE              ASSIGNEE  STATUS       UPDATED",
    &tasks,
    task_line,
  )
}

pub async fn task<S: RecordStore>(store: &S, cmd: TaskCommand) -> anyhow::Result<()> {
  let TaskCommand::Update { id, status } = cmd;
  let task = store.update_task_status(TaskId(id), status).await?;
  println!("Task {} is now {}.", task.id, task.status);
  Ok(())
}

pub async fn export(store: &SqliteStore, dir: PathBuf) -> anyhow::Result<()> {
  let names = store
    .export_all(dir.clone())
    .await
    .with_context(|| format!("export to {} failed", dir.display()))?;
  println!("Exported files to {}:", dir.display());
  for name in names {
    println!("  {name}");
  }
  Ok(())
}
