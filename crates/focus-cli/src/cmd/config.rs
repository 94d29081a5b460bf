//! `focus config`: print the effective configuration.

use crate::output::{OutputMode, pretty_rule, render_mode};
use crate::session::Session;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct ConfigView {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_path: Option<PathBuf>,
    config_exists: bool,
    entries: BTreeMap<String, String>,
}

fn effective_view(session: &Session) -> ConfigView {
    let mut entries: BTreeMap<String, String> = session.config.flatten().into_iter().collect();
    entries.insert(
        "core.database".to_string(),
        session.db_path.display().to_string(),
    );
    entries.insert("output".to_string(), session.output.as_str().to_string());

    ConfigView {
        config_exists: session.config_path.as_ref().is_some_and(|p| p.exists()),
        config_path: session.config_path.clone(),
        entries,
    }
}

pub fn run_config(session: &Session) -> anyhow::Result<()> {
    render_config(session.output, &effective_view(session))
}

fn render_config(mode: OutputMode, view: &ConfigView) -> anyhow::Result<()> {
    render_mode(mode, view, write_entries, render_config_pretty)
}

fn render_config_pretty(view: &ConfigView, w: &mut dyn Write) -> io::Result<()> {
    match &view.config_path {
        Some(path) if view.config_exists => writeln!(w, "Config file: {}", path.display())?,
        Some(path) => writeln!(w, "Config file: {} (not created yet)", path.display())?,
        None => writeln!(w, "Config file: none")?,
    }
    pretty_rule(w)?;
    write_entries(view, w)
}

fn write_entries(view: &ConfigView, w: &mut dyn Write) -> io::Result<()> {
    for (key, value) in &view.entries {
        writeln!(w, "{key} = {value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_core::config::UserConfig;

    #[test]
    fn effective_view_overrides_database_and_output() {
        let mut config = UserConfig {
            output: Some("pretty".into()),
            ..UserConfig::default()
        };
        config.alias.insert("st".into(), "status".into());
        let session = Session::new(
            Some(PathBuf::from("/nonexistent/focus/config.toml")),
            config,
            Some(PathBuf::from("/data/focus.sqlite3")),
            None,
            OutputMode::Json,
        );

        let view = effective_view(&session);
        assert!(!view.config_exists);
        assert_eq!(view.entries["core.database"], "/data/focus.sqlite3");
        assert_eq!(view.entries["output"], "json");
        assert_eq!(view.entries["alias.st"], "status");

        let mut buf = Vec::new();
        write_entries(&view, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "alias.st = status\ncore.database = /data/focus.sqlite3\noutput = json\n"
        );
    }
}
