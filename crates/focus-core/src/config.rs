use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Env var overriding the config file location.
pub const CONFIG_ENV: &str = "FOCUS_CONFIG";
/// Env var overriding the database location.
pub const DB_ENV: &str = "FOCUS_DB";

const APP_DIR: &str = "focus";
const DB_FILE: &str = "focus.sqlite3";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alias: BTreeMap<String, String>,
}

impl UserConfig {
    /// Effective settings as sorted `(key, value)` pairs.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(db) = &self.core.database {
            out.push(("core.database".to_string(), db.display().to_string()));
        }
        if let Some(output) = &self.output {
            out.push(("output".to_string(), output.clone()));
        }
        out.extend(
            self.alias
                .iter()
                .map(|(name, expansion)| (format!("alias.{name}"), expansion.clone())),
        );
        out.sort();
        out
    }

    /// Serialize as TOML for `focus init`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Location of the user config file: `$FOCUS_CONFIG`, else
/// `<config dir>/focus/config.toml`.
#[must_use]
pub fn config_path(env_override: Option<PathBuf>) -> Option<PathBuf> {
    env_override
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml")))
}

/// Load the user config at `path`. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config(path: Option<&Path>) -> Result<UserConfig> {
    let Some(path) = path else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// `<data dir>/focus/focus.sqlite3`, or a relative file when the platform
/// has no data directory.
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(DB_FILE),
        |dir| dir.join(APP_DIR).join(DB_FILE),
    )
}

/// Database path precedence: flag, env var, config file, platform default.
#[must_use]
pub fn resolve_database_path(
    flag: Option<PathBuf>,
    env_db: Option<PathBuf>,
    config: &UserConfig,
) -> PathBuf {
    flag.or_else(|| env_db.filter(|p| !p.as_os_str().is_empty()))
        .or_else(|| config.core.database.clone())
        .unwrap_or_else(default_database_path)
}

/// Canonical output mode name, accepting a few legacy spellings.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" | "plain" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

/// Output mode precedence: explicit flag, `FORMAT` env var, config file,
/// then pretty on a terminal and text when piped.
#[must_use]
pub fn resolve_output(
    cli_format: Option<&str>,
    env_format: Option<&str>,
    config: &UserConfig,
) -> &'static str {
    cli_format
        .and_then(normalize_output_mode)
        .or_else(|| env_format.and_then(normalize_output_mode))
        .or_else(|| config.output.as_deref().and_then(normalize_output_mode))
        .unwrap_or_else(|| {
            if std::io::stdout().is_terminal() {
                "pretty"
            } else {
                "text"
            }
        })
}

/// Replace a leading alias in `args` (program name first) with its expansion.
///
/// Only the first non-flag argument is considered, and names in `builtins`
/// are never treated as aliases.
#[must_use]
pub fn expand_alias(args: Vec<String>, config: &UserConfig, builtins: &[&str]) -> Vec<String> {
    let Some(pos) = first_positional(&args) else {
        return args;
    };

    let name = args[pos].as_str();
    if builtins.contains(&name) {
        return args;
    }
    let Some(expansion) = config.alias.get(name) else {
        return args;
    };

    tracing::debug!(alias = name, expansion = %expansion, "expanding alias");
    let mut out = Vec::with_capacity(args.len() + 2);
    out.extend_from_slice(&args[..pos]);
    out.extend(expansion.split_whitespace().map(str::to_string));
    out.extend_from_slice(&args[pos + 1..]);
    out
}

/// Index of the first argument that is neither a flag nor a global option's value.
fn first_positional(args: &[String]) -> Option<usize> {
    let mut idx = 1;
    while idx < args.len() {
        let arg = args[idx].as_str();
        if !arg.starts_with('-') {
            return Some(idx);
        }
        idx += if matches!(arg, "--db" | "--date" | "--format") {
            2
        } else {
            1
        };
    }
    None
}
