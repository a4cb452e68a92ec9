//! Per-compilation diagnostic list

use crate::{Diagnostic, Severity};
use serde::{Deserialize, Serialize};

/// Diagnostics accumulated while checking one statement.
///
/// The list is scoped to one compilation context. Once it holds an error,
/// callers use [`Diagnostics::has_errors`] to skip work that would only
/// compound the failure (constant folding in particular).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("diagnostic reported: {}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Resolve spans of every diagnostic against the statement text
    pub fn locate(self, source: &str) -> Self {
        Self {
            items: self.items.into_iter().map(|d| d.locate(source)).collect(),
        }
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    /// Render every diagnostic on its own line, colored by severity
    #[cfg(feature = "colored")]
    pub fn render(&self) -> String {
        use colored::Colorize;

        self.items
            .iter()
            .map(|d| {
                let head = match d.severity {
                    Severity::Error => format!("{}[{}]", "error".red().bold(), d.code),
                    Severity::Warning => format!("{}[{}]", "warning".yellow().bold(), d.code),
                };
                let mut line = format!("{}: {}", head, d.message);
                if let Some(loc) = &d.location {
                    line.push_str(&format!(" ({})", loc.to_string().cyan()));
                }
                if let Some(help) = d.help_text() {
                    line.push_str(&format!("\n  {} {}", "help:".green(), help));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
