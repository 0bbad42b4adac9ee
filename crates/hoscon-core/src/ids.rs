//! Integer row identifiers, one newtype per table so they cannot be mixed up.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }
  };
}

row_id!(
  /// Primary key of a `departments` row.
  DepartmentId
);
row_id!(
  /// Primary key of a `staff` row.
  StaffId
);
row_id!(
  /// Primary key of an `incidents` row; assigned by the store, increasing.
  IncidentId
);
row_id!(
  /// Primary key of a `tasks` row.
  TaskId
);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_serialize_as_bare_integers() {
    assert_eq!(serde_json::to_string(&StaffId(7)).unwrap(), "7");
    let id: TaskId = serde_json::from_str("12").unwrap();
    assert_eq!(id, TaskId(12));
  }

  #[test]
  fn display_is_the_raw_number() {
    assert_eq!(IncidentId(42).to_string(), "42");
  }
}
