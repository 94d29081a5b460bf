//! Per-invocation context: resolved config, database path, date, and output mode.

use crate::output::{CliError, OutputMode};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use focus_core::DailyTracker;
use focus_core::config::{self, UserConfig};
use focus_core::db::SqliteStore;
use focus_core::error::ErrorCode;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Session {
    pub config_path: Option<PathBuf>,
    pub config: UserConfig,
    pub db_path: PathBuf,
    pub date: NaiveDate,
    pub output: OutputMode,
}

impl Session {
    pub fn new(
        config_path: Option<PathBuf>,
        config: UserConfig,
        db_flag: Option<PathBuf>,
        date: Option<NaiveDate>,
        output: OutputMode,
    ) -> Self {
        let env_db = std::env::var_os(config::DB_ENV).map(PathBuf::from);
        let db_path = config::resolve_database_path(db_flag, env_db, &config);
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        tracing::debug!(db = %db_path.display(), %date, mode = output.as_str(), "session resolved");
        Self {
            config_path,
            config,
            db_path,
            date,
            output,
        }
    }

    /// Open the existing task database. Only `focus init` creates one.
    pub fn open_store(&self) -> Result<SqliteStore> {
        if !self.db_path.exists() {
            return Err(CliError::from_code(
                ErrorCode::NotInitialized,
                format!("No task database at {}", self.db_path.display()),
            )
            .into());
        }
        SqliteStore::open(&self.db_path)
    }

    /// Bind a tracker to the session date, running rollover if needed.
    pub fn tracker(&self) -> Result<DailyTracker<SqliteStore>> {
        Ok(DailyTracker::from_date(self.open_store()?, self.date)?)
    }
}
