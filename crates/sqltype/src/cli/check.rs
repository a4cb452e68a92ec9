//! Check command implementation

use super::{SessionFlags, output};
use crate::Tree;
use anyhow::{Context, Result};
use serde::Serialize;
use sqltype_diagnostics::Diagnostics;
use sqltype_types::SessionConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the check command
pub struct CheckConfig {
    pub file: PathBuf,
    /// Statement text the tree's spans point into
    pub source: Option<PathBuf>,
    pub flags: SessionFlags,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Typed tree and the diagnostics of one check
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub tree: Tree,
    pub diagnostics: Diagnostics,
}

/// Read, check and return the tree in `file`
pub fn check_file(file: &Path, source: Option<&Path>, config: SessionConfig) -> Result<CheckReport> {
    let text = fs::read_to_string(file).with_context(|| format!("Failed to read tree file: {}", file.display()))?;
    let mut tree = Tree::from_json_str(&text).with_context(|| format!("Invalid tree in {}", file.display()))?;
    let mut diagnostics = tree.check(config);

    if let Some(source) = source {
        let statement = fs::read_to_string(source)
            .with_context(|| format!("Failed to read source file: {}", source.display()))?;
        diagnostics = diagnostics.locate(&statement);
    }
    Ok(CheckReport { tree, diagnostics })
}

/// Run the check command; returns whether the tree checked cleanly
pub fn check(config: CheckConfig) -> Result<bool> {
    if config.verbose {
        eprintln!("Checking: {}", config.file.display());
    }
    let session = config.flags.session_config()?;
    let report = check_file(&config.file, config.source.as_deref(), session)?;

    let json = output::to_json(&report, config.pretty)?;
    output::emit(&json, config.output_file.as_deref())?;

    if !report.diagnostics.is_empty() {
        eprintln!("{}", report.diagnostics.render());
    }
    if let Some(summary) = output::format_summary(&report.diagnostics) {
        eprintln!("{}", summary);
    }
    Ok(!report.diagnostics.has_errors())
}
