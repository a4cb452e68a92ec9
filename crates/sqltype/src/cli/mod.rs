//! CLI functionality for the sqltype tool
//!
//! - Session configuration from a JSON file plus flag overrides
//! - `check`: type a JSON tree and report diagnostics
//! - `types` and `signatures`: inspect the lattice and the catalog
//! - Output formatting

pub mod catalog;
pub mod check;
pub mod output;

use anyhow::{Context, Result};
use sqltype_types::{CompatMode, SessionConfig};
use std::fs;
use std::path::PathBuf;

/// Session flags given on the command line
#[derive(Debug, Clone, Default)]
pub struct SessionFlags {
    pub config: Option<PathBuf>,
    pub plus_as_concat: Option<bool>,
    pub mysql: bool,
    pub no_fold: bool,
    pub strict_dates: bool,
}

impl SessionFlags {
    /// Load the configuration file, then apply the flags over it
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                SessionConfig::from_json_str(&text)
                    .with_context(|| format!("Invalid config file: {}", path.display()))?
            }
            None => SessionConfig::default(),
        };

        if let Some(on) = self.plus_as_concat {
            config = config.with_plus_as_concat(on);
        }
        if self.mysql {
            config = config.with_compat_mode(CompatMode::Mysql);
        }
        if self.no_fold {
            config = config.with_no_fold(true);
        }
        if self.strict_dates {
            config = config.with_fail_on_invalid_date_ops(true);
        }
        log::debug!("session config: {:?}", config);
        Ok(config)
    }
}
