//! `hoscon` — command-line front end for the HOSCON situational record store.
//!
//! # Usage
//!
//! ```text
//! hoscon dashboard
//! hoscon department update Emergency --status red --notes "Diverting"
//! hoscon staff register "Ada Byron" --role "Triage nurse" --department 1
//! hoscon staff update "Ada Byron" --present
//! hoscon incident log --type Fire --description "Kitchen fire" --assign "Ada Byron"
//! hoscon incidents
//! hoscon task update 1 --status in-progress
//! hoscon export --dir exports
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use hoscon_core::store::RecordStore as _;
use hoscon_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hoscon", version, about = "Hospital situational control")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "hoscon.toml", global = true)]
  config: PathBuf,

  /// Print lists as JSON instead of aligned text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the status of every department.
  Dashboard,

  /// Department status updates.
  #[command(subcommand)]
  Department(commands::DepartmentCommand),

  /// Staff roster and muster.
  #[command(subcommand)]
  Staff(commands::StaffCommand),

  /// Log a new incident.
  #[command(subcommand)]
  Incident(commands::IncidentCommand),

  /// List incidents and their tasks.
  Incidents,

  /// Response task updates.
  #[command(subcommand)]
  Task(commands::TaskCommand),

  /// Write CSV files and a JSON bundle of every table.
  Export {
    /// Output directory; defaults to `export_dir` from the config.
    #[arg(long)]
    dir: Option<PathBuf>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so that stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  store
    .seed_departments(cfg.departments.clone())
    .await
    .context("failed to seed departments")?;

  let out = commands::Output { json: cli.json };
  match cli.command {
    Command::Dashboard => commands::dashboard(&store, out).await,
    Command::Department(cmd) => commands::department(&store, cmd).await,
    Command::Staff(cmd) => commands::staff(&store, cmd, out).await,
    Command::Incident(cmd) => commands::incident(&store, cmd).await,
    Command::Incidents => commands::incidents(&store, out).await,
    Command::Task(cmd) => commands::task(&store, cmd).await,
    Command::Export { dir } => {
      let dir = dir.unwrap_or(cfg.export_dir);
      commands::export(&store, dir).await
    }
  }
}
