//! Error type for `hoscon-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain-level rejection: duplicate name, missing row, bad input.
  #[error(transparent)]
  Core(#[from] hoscon_core::Error),

  /// The database could not be opened, read, written or committed.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("export error: {0}")]
  Export(#[from] hoscon_core::export::ExportError),

  #[error("export task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl Error {
  /// The domain error, if this is one.
  pub fn as_core(&self) -> Option<&hoscon_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
