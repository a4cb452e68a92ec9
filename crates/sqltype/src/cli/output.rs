//! Terminal and file output for the CLI

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use sqltype_diagnostics::Diagnostics;
use std::fs;
use std::path::Path;

/// When to color terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn apply(self) {
        match self {
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
            Self::Auto => colored::control::unset_override(),
        }
    }
}

pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "error:".red().bold(), error)
}

/// One-line outcome of a check, `None` when there is nothing to say
pub fn format_summary(diagnostics: &Diagnostics) -> Option<String> {
    let errors = diagnostics.error_count();
    let warnings = diagnostics.len() - errors;
    match (errors, warnings) {
        (0, 0) => None,
        (0, w) => Some(format!("{} {} warning(s)", "checked:".green().bold(), w)),
        (e, w) => Some(format!("{} {} error(s), {} warning(s)", "check failed:".red().bold(), e, w)),
    }
}

/// Typed tree as JSON
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("cannot serialize the typed tree")
}

/// Write `content` to `path`, or to stdout without one
pub fn emit(content: &str, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        println!("{}", content);
        return Ok(());
    };
    fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("typed tree written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqltype_diagnostics::{Diagnostic, SQT0100};

    #[test]
    fn test_summary_counts_errors() {
        colored::control::set_override(false);
        let mut diagnostics = Diagnostics::default();
        assert_eq!(format_summary(&diagnostics), None);

        diagnostics.report(Diagnostic::error(SQT0100, "operator not defined"));
        assert_eq!(
            format_summary(&diagnostics).as_deref(),
            Some("check failed: 1 error(s), 0 warning(s)")
        );
    }
}
