//! Incidents and their response tasks.
//!
//! An incident is immutable once logged. Logging one always creates exactly
//! one task for it in the same unit of work; afterwards only the task's
//! status (and with it, its timestamp) changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  ids::{IncidentId, StaffId, TaskId},
};

/// Title given to the task created alongside every incident.
pub const INITIAL_TASK_TITLE: &str = "Initial Response";

// ─── Incident ────────────────────────────────────────────────────────────────

/// A row of the `incidents` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
  pub id:          IncidentId,
  /// Free-text incident type, e.g. "Fire" or "Mass casualty".
  #[serde(rename = "type")]
  pub kind:        String,
  pub description: String,
  /// Store-assigned; never changes after creation.
  pub timestamp:   DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::log_incident`].
/// The timestamp is always set by the store.
#[derive(Debug, Clone)]
pub struct NewIncident {
  pub kind:        String,
  pub description: String,
  /// Staff member who owns the initial task, if anyone is on the roster.
  pub assigned_to: Option<StaffId>,
}

impl NewIncident {
  pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
    Self { kind: kind.into(), description: description.into(), assigned_to: None }
  }

  pub fn assigned_to(mut self, staff_id: StaffId) -> Self {
    self.assigned_to = Some(staff_id);
    self
  }
}

// ─── Task ────────────────────────────────────────────────────────────────────

/// Progress of a response task: Open → In Progress → Completed.
///
/// Transitions are not enforced; the operator may move a task to any status.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum TaskStatus {
  #[default]
  Open,
  #[serde(rename = "In Progress")]
  #[strum(to_string = "In Progress", serialize = "in-progress", serialize = "in_progress")]
  InProgress,
  Completed,
}

impl TaskStatus {
  /// Parse the string stored in the `status` column.
  pub fn decode(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

/// A row of the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub id:          TaskId,
  pub incident_id: IncidentId,
  pub title:       String,
  pub assigned_to: Option<StaffId>,
  pub status:      TaskStatus,
  /// Time of the last status change (or of creation).
  pub timestamp:   DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn in_progress_displays_with_a_space() {
    assert_eq!(TaskStatus::InProgress.to_string(), "In Progress");
    assert_eq!(
      serde_json::to_string(&TaskStatus::InProgress).unwrap(),
      "\"In Progress\""
    );
  }

  #[test]
  fn status_accepts_cli_spellings() {
    assert_eq!(TaskStatus::decode("in-progress").unwrap(), TaskStatus::InProgress);
    assert_eq!(TaskStatus::decode("in progress").unwrap(), TaskStatus::InProgress);
    assert_eq!(TaskStatus::decode("completed").unwrap(), TaskStatus::Completed);
  }

  #[test]
  fn status_strings_round_trip() {
    for status in TaskStatus::iter() {
      assert_eq!(TaskStatus::decode(&status.to_string()).unwrap(), status);
    }
  }

  #[test]
  fn incident_kind_serializes_as_type() {
    let incident = Incident {
      id:          IncidentId(1),
      kind:        "Fire".into(),
      description: "Kitchen fire".into(),
      timestamp:   Utc::now(),
    };
    let json = serde_json::to_value(&incident).unwrap();
    assert_eq!(json["type"], "Fire");
    assert!(json.get("kind").is_none());
  }
}
