//! Staff roster and muster (check-in) state.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ids::{DepartmentId, StaffId},
};

/// A row of the `staff` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
  pub id:            StaffId,
  /// Unique across the roster; registration rejects duplicates.
  pub name:          String,
  pub role:          String,
  pub department_id: Option<DepartmentId>,
  /// Checked in at muster.
  pub present:       bool,
}

/// Input to [`crate::store::RecordStore::register_staff`].
/// New staff always start absent.
#[derive(Debug, Clone)]
pub struct NewStaff {
  pub name:          String,
  pub role:          String,
  pub department_id: DepartmentId,
}

impl NewStaff {
  pub fn new(
    name: impl Into<String>,
    role: impl Into<String>,
    department_id: DepartmentId,
  ) -> Self {
    Self { name: name.into(), role: role.into(), department_id }
  }

  /// Trim the text fields and reject any that end up empty.
  pub fn validated(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    let role = self.role.trim().to_owned();
    if name.is_empty() {
      return Err(Error::MissingField("name"));
    }
    if role.is_empty() {
      return Err(Error::MissingField("role"));
    }
    Ok(Self { name, role, department_id: self.department_id })
  }
}

/// Input to [`crate::store::RecordStore::update_staff`]. Every mutable field
/// is overwritten.
#[derive(Debug, Clone)]
pub struct StaffUpdate {
  pub role:          String,
  pub department_id: DepartmentId,
  pub present:       bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validated_trims_whitespace() {
    let input = NewStaff::new("  Dr. Grey ", " Surgeon", DepartmentId(1))
      .validated()
      .unwrap();
    assert_eq!(input.name, "Dr. Grey");
    assert_eq!(input.role, "Surgeon");
  }

  #[test]
  fn validated_rejects_blank_name() {
    let err = NewStaff::new("   ", "Nurse", DepartmentId(1)).validated();
    assert!(matches!(err, Err(Error::MissingField("name"))));
  }

  #[test]
  fn validated_rejects_blank_role() {
    let err = NewStaff::new("Sam", "", DepartmentId(1)).validated();
    assert!(matches!(err, Err(Error::MissingField("role"))));
  }
}
