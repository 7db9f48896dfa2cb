use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const STORE_FILE_NAME: &str = "contacts.json";
const APP_NAME: &str = "alphabook";

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the configuration was read from, if a file existed.
    pub config_path: Option<PathBuf>,
    pub store_path: PathBuf,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Print contact ids next to each contact
    pub show_ids: bool,
    /// List letters without contacts in the A-Z overview
    pub show_empty_letters: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_ids: true,
            show_empty_letters: true,
        }
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

fn default_store_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine data directories")?;
    Ok(base.data_dir().join(APP_NAME).join(STORE_FILE_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load the configuration. An explicitly given path must exist; the default
/// location may be absent, in which case defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            let path = expand_tilde(path);
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            path
        }
        None => {
            let path = config_path()?;
            if !path.exists() {
                tracing::debug!("no configuration at {}; using defaults", path.display());
                return from_file(ConfigFile::default(), None);
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    parse(&raw, path)
}

fn parse(raw: &str, path: PathBuf) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", path.display()))?;

    from_file(cfg_file, Some(path))
}

fn from_file(cfg_file: ConfigFile, config_path: Option<PathBuf>) -> Result<Config> {
    let store_path = match cfg_file.store_path {
        Some(path) if path.as_os_str().is_empty() => {
            bail!("`store_path` must not be empty");
        }
        Some(path) => expand_tilde(&path),
        None => default_store_path()?,
    };

    Ok(Config {
        config_path,
        store_path,
        display: cfg_file.display.into(),
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known = HashSet::from(["store_path", "display"]);
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            tracing::warn!("unknown configuration key `{}`", key);
        }
    }

    if let Some(display) = table.get("display").and_then(toml::Value::as_table) {
        let known = HashSet::from(["show_ids", "show_empty_letters"]);
        for key in display.keys() {
            if !known.contains(key.as_str()) {
                tracing::warn!("unknown configuration key `display.{}`", key);
            }
        }
    }
}

// =============================================================================
// File representation
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    store_path: Option<PathBuf>,
    #[serde(default)]
    display: DisplayFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DisplayFile {
    show_ids: bool,
    show_empty_letters: bool,
}

impl Default for DisplayFile {
    fn default() -> Self {
        let defaults = DisplayConfig::default();
        Self {
            show_ids: defaults.show_ids,
            show_empty_letters: defaults.show_empty_letters,
        }
    }
}

impl From<DisplayFile> for DisplayConfig {
    fn from(file: DisplayFile) -> Self {
        Self {
            show_ids: file.show_ids,
            show_empty_letters: file.show_empty_letters,
        }
    }
}
