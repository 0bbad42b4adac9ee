//! Departments — organisational units with a traffic-light status.
//!
//! Departments are seeded at startup and never deleted. Only their status
//! and notes change during an event.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result, ids::DepartmentId};

/// Operational status of a department.
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
pub enum DepartmentStatus {
  #[default]
  Green,
  Yellow,
  Red,
}

impl DepartmentStatus {
  /// Parse the string stored in the `status` column.
  pub fn decode(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

/// A row of the `departments` table. `name` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id:     DepartmentId,
  pub name:   String,
  pub status: DepartmentStatus,
  pub notes:  String,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn status_strings_round_trip() {
    for status in DepartmentStatus::iter() {
      assert_eq!(DepartmentStatus::decode(&status.to_string()).unwrap(), status);
    }
  }

  #[test]
  fn status_parse_ignores_case() {
    assert_eq!(DepartmentStatus::decode("yellow").unwrap(), DepartmentStatus::Yellow);
    assert_eq!(DepartmentStatus::decode("RED").unwrap(), DepartmentStatus::Red);
  }

  #[test]
  fn unknown_status_is_rejected() {
    assert!(matches!(
      DepartmentStatus::decode("Amber"),
      Err(Error::UnknownStatus(s)) if s == "Amber"
    ));
  }
}
