//! Session configuration consumed by the checker

use crate::{BuiltinCollations, CollationId, CollationProvider, Codeset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date/numeric compatibility mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatMode {
    #[default]
    Standard,
    /// Integers and temporal values unify to BIGINT
    Mysql,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid session configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown collation '{0}'")]
    UnknownCollation(String),
}

/// Flags supplied by the environment for one compilation unit.
///
/// Never mutated by the checker; every function that needs a flag receives
/// the configuration explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// `+` also concatenates strings
    pub plus_as_concat: bool,
    /// NULL behaves as the empty string in concatenation and REPLACE
    pub oracle_style_empty_string: bool,
    pub compat_mode: CompatMode,
    /// Function-style fold errors yield NULL instead of failing
    pub return_null_on_function_errors: bool,
    /// NUMERIC division keeps the operand scale instead of the minimum division scale
    pub compat_numeric_division_scale: bool,
    /// Operations on the zero date are hard errors instead of NULL
    pub fail_on_invalid_date_ops: bool,
    /// Session collation used for literals and host variables
    pub default_collation: CollationId,
    /// Disable constant folding for the whole unit
    pub no_fold: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            plus_as_concat: true,
            oracle_style_empty_string: false,
            compat_mode: CompatMode::Standard,
            return_null_on_function_errors: false,
            compat_numeric_division_scale: false,
            fail_on_invalid_date_ops: false,
            default_collation: CollationId::UTF8_BIN,
            no_fold: false,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_plus_as_concat(mut self, on: bool) -> Self {
        self.plus_as_concat = on;
        self
    }

    pub fn with_oracle_style_empty_string(mut self, on: bool) -> Self {
        self.oracle_style_empty_string = on;
        self
    }

    pub fn with_compat_mode(mut self, mode: CompatMode) -> Self {
        self.compat_mode = mode;
        self
    }

    pub fn with_return_null_on_function_errors(mut self, on: bool) -> Self {
        self.return_null_on_function_errors = on;
        self
    }

    pub fn with_compat_numeric_division_scale(mut self, on: bool) -> Self {
        self.compat_numeric_division_scale = on;
        self
    }

    pub fn with_fail_on_invalid_date_ops(mut self, on: bool) -> Self {
        self.fail_on_invalid_date_ops = on;
        self
    }

    pub fn with_no_fold(mut self, on: bool) -> Self {
        self.no_fold = on;
        self
    }

    /// Set the session collation by name
    pub fn with_default_collation_name(mut self, name: &str) -> Result<Self, ConfigError> {
        let collation = BuiltinCollations
            .by_name(name)
            .ok_or_else(|| ConfigError::UnknownCollation(name.to_string()))?;
        self.default_collation = collation.id;
        Ok(self)
    }

    /// Codeset of the session collation
    pub fn default_codeset(&self, provider: &dyn CollationProvider) -> Codeset {
        provider
            .codeset_of(self.default_collation)
            .unwrap_or(Codeset::Utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            SessionConfig::from_json_str(r#"{"plus_as_concat": false, "compat_mode": "mysql"}"#).unwrap();
        assert!(!config.plus_as_concat);
        assert_eq!(config.compat_mode, CompatMode::Mysql);
        assert_eq!(config.default_collation, CollationId::UTF8_BIN);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SessionConfig::from_json_str("{plus_as_concat"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_collation_by_name() {
        let config = SessionConfig::default()
            .with_default_collation_name("euckr_bin")
            .unwrap();
        assert_eq!(config.default_codeset(&BuiltinCollations), Codeset::EucKr);
        assert!(SessionConfig::default().with_default_collation_name("klingon").is_err());
    }
}
