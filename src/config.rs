//! User configuration, read from `config.toml` in the platform config
//! directory. Every key is optional:
//!
//! ```toml
//! user = "ada@example.com"
//! log = "taskboard=debug"
//! default_columns = ["Backlog", "Doing", "Done"]
//! ```
//!
//! `TASKBOARD_USER` and `TASKBOARD_LOG` override the file.

use crate::backend::Identity;
use crate::model::DEFAULT_COLUMNS;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const USER_ENV: &str = "TASKBOARD_USER";
pub const LOG_ENV: &str = "TASKBOARD_LOG";
const DEFAULT_LOG: &str = "info";
const FALLBACK_USER: &str = "local";

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub user: Option<String>,
    pub log: Option<String>,
    pub default_columns: Option<Vec<String>>,
}

impl Config {
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Config::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        toml::from_str(&raw).with_context(|| format!("parsing {:?}", path))
    }

    pub fn default_columns(&self) -> Vec<String> {
        match &self.default_columns {
            Some(columns) if !columns.is_empty() => columns.clone(),
            _ => DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn log_filter(&self) -> String {
        env::var(LOG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.log.clone())
            .unwrap_or_else(|| DEFAULT_LOG.to_string())
    }

    pub fn identity(&self) -> ConfigIdentity {
        ConfigIdentity {
            configured: self.user.clone(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taskboard").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Resolves the current user from the environment and configuration.
pub struct ConfigIdentity {
    configured: Option<String>,
}

impl Identity for ConfigIdentity {
    fn current_user_id(&self) -> Result<String> {
        let os_user = env::var("USER").or_else(|_| env::var("USERNAME")).ok();
        Ok(resolve_user(
            env::var(USER_ENV).ok(),
            self.configured.clone(),
            os_user,
        ))
    }
}

fn resolve_user(
    env_user: Option<String>,
    configured: Option<String>,
    os_user: Option<String>,
) -> String {
    [env_user, configured, os_user]
        .into_iter()
        .flatten()
        .map(|u| u.trim().to_string())
        .find(|u| !u.is_empty())
        .unwrap_or_else(|| FALLBACK_USER.to_string())
}
