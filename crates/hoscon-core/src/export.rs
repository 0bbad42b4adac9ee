//! Bulk export of a [`Snapshot`] to CSV files plus one JSON bundle.
//!
//! Layout of the export directory after a successful run:
//!
//! | File | Contents |
//! |------|----------|
//! | `departments.csv` | header row + one row per department |
//! | `staff.csv` | header row + one row per staff member |
//! | `incidents.csv` | header row + one row per incident |
//! | `tasks.csv` | header row + one row per task |
//! | `bundle.json` | `{"departments": [...], "staff": [...], ...}`, pretty-printed |
//!
//! Artifacts are written into a hidden staging directory first and only
//! renamed into place once all five are complete, so a failed export leaves
//! the previous one untouched.

use std::{
  fs,
  io::{BufWriter, Write as _},
  path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  department::Department,
  incident::{Incident, Task},
  staff::Staff,
  store::Snapshot,
};

/// File name of the combined JSON document.
pub const BUNDLE_FILE: &str = "bundle.json";

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("i/o error at {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv error at {path:?}: {source}")]
  Csv {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// An artifact's destination is occupied by a directory.
  #[error("export target {0:?} is a directory")]
  TargetIsDirectory(PathBuf),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
  move |source| ExportError::Io { path: path.to_path_buf(), source }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A row type that maps onto one table and one CSV file.
///
/// `COLUMNS` must list the serialised field names in declaration order.
pub trait Record: Serialize {
  const TABLE: &'static str;
  const COLUMNS: &'static [&'static str];
}

impl Record for Department {
  const TABLE: &'static str = "departments";
  const COLUMNS: &'static [&'static str] = &["id", "name", "status", "notes"];
}

impl Record for Staff {
  const TABLE: &'static str = "staff";
  const COLUMNS: &'static [&'static str] =
    &["id", "name", "role", "department_id", "present"];
}

impl Record for Incident {
  const TABLE: &'static str = "incidents";
  const COLUMNS: &'static [&'static str] = &["id", "type", "description", "timestamp"];
}

impl Record for Task {
  const TABLE: &'static str = "tasks";
  const COLUMNS: &'static [&'static str] =
    &["id", "incident_id", "title", "assigned_to", "status", "timestamp"];
}

fn csv_file_name<R: Record>() -> String { format!("{}.csv", R::TABLE) }

// ─── Writers ─────────────────────────────────────────────────────────────────

/// Write `rows` as CSV to `path`. The header is always written, even when
/// there are no rows.
fn write_csv<R: Record>(path: &Path, rows: &[R]) -> Result<(), ExportError> {
  let csv_err = |source| ExportError::Csv { path: path.to_path_buf(), source };

  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_path(path)
    .map_err(csv_err)?;
  writer.write_record(R::COLUMNS).map_err(csv_err)?;
  for row in rows {
    writer.serialize(row).map_err(csv_err)?;
  }
  writer.flush().map_err(io_err(path))?;
  Ok(())
}

fn write_bundle(path: &Path, snapshot: &Snapshot) -> Result<(), ExportError> {
  let file = fs::File::create(path).map_err(io_err(path))?;
  let mut writer = BufWriter::new(file);
  serde_json::to_writer_pretty(&mut writer, snapshot)?;
  writer.write_all(b"\n").map_err(io_err(path))?;
  writer.flush().map_err(io_err(path))?;
  Ok(())
}

/// Write every artifact into `staging` and return their file names.
fn write_all(staging: &Path, snapshot: &Snapshot) -> Result<Vec<String>, ExportError> {
  let mut names = vec![
    csv_file_name::<Department>(),
    csv_file_name::<Staff>(),
    csv_file_name::<Incident>(),
    csv_file_name::<Task>(),
    BUNDLE_FILE.to_owned(),
  ];

  write_csv(&staging.join(&names[0]), &snapshot.departments)?;
  write_csv(&staging.join(&names[1]), &snapshot.staff)?;
  write_csv(&staging.join(&names[2]), &snapshot.incidents)?;
  write_csv(&staging.join(&names[3]), &snapshot.tasks)?;
  write_bundle(&staging.join(&names[4]), snapshot)?;

  names.sort();
  Ok(names)
}

/// Fail if any artifact's destination cannot be replaced by a plain file.
/// Runs before the first rename so a rejected export publishes nothing.
fn check_targets(dir: &Path, names: &[String]) -> Result<(), ExportError> {
  for name in names {
    let target = dir.join(name);
    match fs::symlink_metadata(&target) {
      Ok(meta) if meta.is_dir() => return Err(ExportError::TargetIsDirectory(target)),
      Ok(_) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(io_err(&target)(e)),
    }
  }
  Ok(())
}

/// Export `snapshot` into `dir`, creating it if necessary and replacing any
/// earlier export there. Returns the names of the files produced, sorted.
pub fn write_snapshot(
  snapshot: &Snapshot,
  dir: impl AsRef<Path>,
) -> Result<Vec<String>, ExportError> {
  let dir = dir.as_ref();
  fs::create_dir_all(dir).map_err(io_err(dir))?;

  let staging = dir.join(format!(".staging-{}", Uuid::new_v4().simple()));
  fs::create_dir(&staging).map_err(io_err(&staging))?;

  let result = write_all(&staging, snapshot).and_then(|names| {
    check_targets(dir, &names)?;
    for name in &names {
      let target = dir.join(name);
      fs::rename(staging.join(name), &target).map_err(io_err(&target))?;
    }
    Ok(names)
  });

  if let Err(e) = fs::remove_dir_all(&staging) {
    tracing::warn!(path = ?staging, error = %e, "failed to remove export staging directory");
  }

  match &result {
    Ok(names) => tracing::info!(dir = ?dir, files = names.len(), "export written"),
    Err(e) => tracing::error!(dir = ?dir, error = %e, "export failed"),
  }
  result
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    department::DepartmentStatus,
    ids::{DepartmentId, IncidentId, StaffId, TaskId},
    incident::{INITIAL_TASK_TITLE, TaskStatus},
  };

  fn sample() -> Snapshot {
    let now = Utc::now();
    Snapshot {
      departments: vec![
        Department {
          id:     DepartmentId(1),
          name:   "Emergency".into(),
          status: DepartmentStatus::Red,
          notes:  "Surge, diverting, \"all hands\"".into(),
        },
        Department {
          id:     DepartmentId(2),
          name:   "Radiology".into(),
          status: DepartmentStatus::Green,
          notes:  String::new(),
        },
      ],
      staff:       vec![Staff {
        id:            StaffId(1),
        name:          "Ada".into(),
        role:          "Triage nurse".into(),
        department_id: Some(DepartmentId(1)),
        present:       true,
      }],
      incidents:   vec![Incident {
        id:          IncidentId(1),
        kind:        "Fire".into(),
        description: "Kitchen fire".into(),
        timestamp:   now,
      }],
      tasks:       vec![Task {
        id:          TaskId(1),
        incident_id: IncidentId(1),
        title:       INITIAL_TASK_TITLE.into(),
        assigned_to: None,
        status:      TaskStatus::InProgress,
        timestamp:   now,
      }],
    }
  }

  fn read_csv(path: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(str::to_owned).collect();
    let rows = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
    (headers, rows)
  }

  #[test]
  fn writes_all_five_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let names = write_snapshot(&sample(), dir.path()).unwrap();
    assert_eq!(
      names,
      ["bundle.json", "departments.csv", "incidents.csv", "staff.csv", "tasks.csv"]
    );
    for name in &names {
      assert!(dir.path().join(name).is_file(), "{name} missing");
    }
  }

  fn staging_leftovers(dir: &Path) -> usize {
    fs::read_dir(dir)
      .unwrap()
      .filter_map(|e| e.ok())
      .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
      .count()
  }

  #[test]
  fn staging_directory_is_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&sample(), dir.path()).unwrap();
    assert_eq!(staging_leftovers(dir.path()), 0);
  }

  #[test]
  fn failed_export_leaves_previous_artifacts_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&sample(), dir.path()).unwrap();

    let kept = ["bundle.json", "incidents.csv", "staff.csv", "tasks.csv"];
    let before: Vec<Vec<u8>> =
      kept.iter().map(|name| fs::read(dir.path().join(name)).unwrap()).collect();

    // A non-empty directory where departments.csv belongs cannot be replaced.
    let blocked = dir.path().join("departments.csv");
    fs::remove_file(&blocked).unwrap();
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep"), b"x").unwrap();

    let err = write_snapshot(&Snapshot::default(), dir.path()).unwrap_err();
    assert!(matches!(err, ExportError::TargetIsDirectory(ref p) if *p == blocked));

    for (name, old) in kept.iter().zip(&before) {
      assert_eq!(&fs::read(dir.path().join(name)).unwrap(), old, "{name} changed");
    }
    assert!(blocked.join("keep").is_file());
    assert_eq!(staging_leftovers(dir.path()), 0);
  }

  #[test]
  fn csv_headers_match_columns_and_quote_commas() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&sample(), dir.path()).unwrap();

    let (headers, rows) = read_csv(&dir.path().join("departments.csv"));
    assert_eq!(headers, Department::COLUMNS);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][3], "Surge, diverting, \"all hands\"");
    assert_eq!(&rows[0][2], "Red");

    let (headers, rows) = read_csv(&dir.path().join("tasks.csv"));
    assert_eq!(headers, Task::COLUMNS);
    assert_eq!(&rows[0][3], "");
    assert_eq!(&rows[0][4], "In Progress");
  }

  #[test]
  fn empty_tables_still_get_a_header() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&Snapshot::default(), dir.path()).unwrap();
    let (headers, rows) = read_csv(&dir.path().join("incidents.csv"));
    assert_eq!(headers, Incident::COLUMNS);
    assert!(rows.is_empty());
  }

  #[test]
  fn bundle_is_keyed_by_table_name() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&sample(), dir.path()).unwrap();

    let raw = fs::read_to_string(dir.path().join(BUNDLE_FILE)).unwrap();
    let bundle: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(bundle["departments"].as_array().unwrap().len(), 2);
    assert_eq!(bundle["staff"].as_array().unwrap().len(), 1);
    assert_eq!(bundle["incidents"][0]["type"], "Fire");
    assert_eq!(bundle["tasks"][0]["incident_id"], 1);

    let record = bundle["staff"][0].as_object().unwrap();
    assert_eq!(record.len(), Staff::COLUMNS.len());
    assert!(Staff::COLUMNS.iter().all(|c| record.contains_key(*c)));
  }

  #[test]
  fn second_export_overwrites_the_first() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(&sample(), dir.path()).unwrap();
    write_snapshot(&Snapshot::default(), dir.path()).unwrap();
    let (_, rows) = read_csv(&dir.path().join("departments.csv"));
    assert!(rows.is_empty());
  }

  #[test]
  fn unwritable_location_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();
    let err = write_snapshot(&sample(), blocker.join("exports")).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
  }
}
