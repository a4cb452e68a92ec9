//! Per-compilation checker state

use crate::error::CheckError;
use sqltype_diagnostics::{Diagnostic, Diagnostics, ErrorCode, Span};
use sqltype_eval::EvaluationContext;
use sqltype_types::{
    BuiltinCollations, Codeset, Collation, CollationId, CollationProvider, CompatMode, SessionConfig,
};

/// State threaded through one type-checking pass.
///
/// The session configuration and the `now` snapshot are read-only for the
/// whole pass; only the diagnostic list grows.
#[derive(Debug)]
pub struct CheckContext {
    eval: EvaluationContext,
    collations: Box<dyn CollationProvider>,
    diagnostics: Diagnostics,
}

impl Default for CheckContext {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl CheckContext {
    pub fn new(config: SessionConfig) -> Self {
        Self::from_evaluation_context(EvaluationContext::new(config))
    }

    pub fn from_evaluation_context(eval: EvaluationContext) -> Self {
        Self {
            eval,
            collations: Box::new(BuiltinCollations),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Replace the built-in collation table with an external locale service
    pub fn with_collations(mut self, provider: impl CollationProvider + 'static) -> Self {
        self.collations = Box::new(provider);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.eval.config
    }

    pub fn mode(&self) -> CompatMode {
        self.eval.config.compat_mode
    }

    pub fn evaluation_context(&self) -> &EvaluationContext {
        &self.eval
    }

    pub fn collations(&self) -> &dyn CollationProvider {
        self.collations.as_ref()
    }

    pub fn collation(&self, id: CollationId) -> Option<&Collation> {
        self.collations.collation(id)
    }

    /// Session collation and its codeset
    pub fn session_collation(&self) -> (CollationId, Codeset) {
        let config = self.config();
        (config.default_collation, config.default_codeset(self.collations()))
    }

    /// An error is already recorded; later folding is skipped
    pub fn error_pending(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn report(&mut self, error: &CheckError, span: Option<Span>) {
        let mut diagnostic = error.to_diagnostic();
        if let Some(span) = span {
            diagnostic = diagnostic.with_span(span);
        }
        self.diagnostics.report(diagnostic);
    }

    /// Record a warning; warnings never suppress folding
    pub fn warn(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.diagnostics.report(Diagnostic::warning(code, message));
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Hand the collected diagnostics to the caller, leaving the list empty
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}
