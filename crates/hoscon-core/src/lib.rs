//! Core types and trait definitions for the HOSCON situational record store.
//!
//! This crate is deliberately free of database dependencies. The storage
//! backend and the command-line front end both depend on it.

pub mod department;
pub mod error;
pub mod export;
pub mod ids;
pub mod incident;
pub mod staff;
pub mod store;

pub use error::{Error, Result};
