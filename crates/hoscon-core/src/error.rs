//! Error types for `hoscon-core`.

use thiserror::Error;

use crate::ids::{StaffId, TaskId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("staff member {0:?} already exists")]
  DuplicateName(String),

  #[error("department not found: {0:?}")]
  DepartmentNotFound(String),

  #[error("staff member not found: {0}")]
  StaffNotFound(StaffId),

  #[error("task not found: {0}")]
  TaskNotFound(TaskId),

  /// A required input was empty or whitespace only.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
