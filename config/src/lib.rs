//! Load configuration from XDG `config.toml` and a project `.env`, then apply it to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! The `concierge` library reads all of its settings from the environment, so this crate is the
//! single place where files are turned into env vars. Call [`load_and_apply`] once at startup,
//! before anything reads `CONCIERGE_*` variables.

mod dotenv;
mod xdg_toml;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application name used for the XDG path `~/.config/concierge/config.toml`.
pub const APP_NAME: &str = "concierge";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Which keys were set by [`load_and_apply`], grouped by the file they came from.
///
/// Keys already present in the process environment appear in neither list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Applied {
    pub from_dotenv: Vec<String>,
    pub from_xdg: Vec<String>,
}

impl Applied {
    /// Total number of variables written to the environment.
    pub fn len(&self) -> usize {
        self.from_dotenv.len() + self.from_xdg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the XDG config file path for `app_name` if it exists.
pub fn config_file(app_name: &str) -> Result<Option<PathBuf>, LoadError> {
    xdg_toml::config_path(app_name)
}

/// Loads config from XDG `config.toml` and optional project `.env`, then sets environment
/// variables only for keys that are **not** already set.
///
/// Order of precedence when a key is missing in the process environment:
/// 1. Value from project `.env` (current directory, or `override_dir` if given)
/// 2. Value from `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]` table
///
/// A malformed `config.toml` is an error; a missing one is not.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Applied, LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let keys: BTreeSet<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    let mut applied = Applied::default();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key) {
            std::env::set_var(key, v);
            applied.from_dotenv.push(key.clone());
        } else if let Some(v) = xdg_map.get(key) {
            std::env::set_var(key, v);
            applied.from_xdg.push(key.clone());
        }
    }
    Ok(applied)
}

/// Serializes tests that mutate process-wide env vars.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
