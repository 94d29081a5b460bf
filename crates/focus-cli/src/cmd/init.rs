use crate::output::{OutputMode, render_mode};
use crate::session::Session;
use anyhow::{Context as _, Result};
use clap::Args;
use focus_core::db::SqliteStore;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config file even if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    config: PathBuf,
    database: PathBuf,
}

/// Execute `focus init`: write the user config pointing at the resolved
/// database, then create and migrate that database.
///
/// Existing aliases and output settings are kept on `--force`. An existing
/// database is migrated in place, never truncated.
pub fn run_init(args: &InitArgs, session: &Session) -> Result<()> {
    let config_path = session
        .config_path
        .clone()
        .context("No config directory on this platform; set FOCUS_CONFIG")?;

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use `focus init --force` to reinitialize.",
            config_path.display()
        );
    }

    let database = std::path::absolute(&session.db_path)
        .with_context(|| format!("Failed to resolve {}", session.db_path.display()))?;

    let mut config = session.config.clone();
    config.core.database = Some(database.clone());

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    std::fs::write(&config_path, config.to_toml()?)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    SqliteStore::open(&database)?;
    tracing::info!(config = %config_path.display(), db = %database.display(), "initialized");

    render_init(
        session.output,
        &InitReport {
            config: config_path,
            database,
        },
    )
}

fn render_init(mode: OutputMode, report: &InitReport) -> Result<()> {
    render_mode(
        mode,
        report,
        |r, w| {
            writeln!(w, "config\t{}", r.config.display())?;
            writeln!(w, "database\t{}", r.database.display())
        },
        |r, w| {
            writeln!(w, "✓ Initialized focus.")?;
            writeln!(w)?;
            writeln!(w, "  Config:   {}", r.config.display())?;
            writeln!(w, "  Database: {}", r.database.display())?;
            writeln!(w)?;
            writeln!(w, "Next steps:")?;
            writeln!(w, "  focus add \"My first task\"")?;
            writeln!(w, "  focus status")
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use focus_core::config::{UserConfig, load_user_config};

    fn session(dir: &std::path::Path, config: UserConfig) -> Session {
        Session::new(
            Some(dir.join("cfg/config.toml")),
            config,
            Some(dir.join("data/focus.sqlite3")),
            NaiveDate::from_ymd_opt(2024, 1, 8),
            OutputMode::Text,
        )
    }

    #[test]
    fn init_writes_config_and_database() {
        let dir = tempfile::tempdir().expect("temp dir");
        let s = session(dir.path(), UserConfig::default());

        run_init(&InitArgs { force: false }, &s).expect("init");

        assert!(dir.path().join("data/focus.sqlite3").exists());
        let written = load_user_config(Some(&dir.path().join("cfg/config.toml"))).expect("load");
        assert_eq!(
            written.core.database,
            Some(dir.path().join("data/focus.sqlite3"))
        );
    }

    #[test]
    fn second_init_requires_force_and_keeps_aliases() {
        let dir = tempfile::tempdir().expect("temp dir");
        run_init(&InitArgs { force: false }, &session(dir.path(), UserConfig::default()))
            .expect("first init");

        let mut config = UserConfig::default();
        config.alias.insert("st".into(), "status".into());
        let s = session(dir.path(), config);

        let err = run_init(&InitArgs { force: false }, &s).expect_err("exists");
        assert!(err.to_string().contains("--force"));

        run_init(&InitArgs { force: true }, &s).expect("forced init");
        let written = load_user_config(Some(&dir.path().join("cfg/config.toml"))).expect("load");
        assert_eq!(written.alias.get("st").map(String::as_str), Some("status"));
    }
}
