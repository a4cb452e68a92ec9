//! Evaluation context for constant folding

use chrono::NaiveDateTime;
use sqltype_types::SessionConfig;

/// Read-only session state consulted while folding
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub config: SessionConfig,
    /// Snapshot of the current date and time for the compilation unit
    pub now: NaiveDateTime,
    pub user: String,
    pub database: String,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EvaluationContext {
    /// Context with the current local time as snapshot
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            now: chrono::Local::now().naive_local(),
            user: String::new(),
            database: String::new(),
        }
    }

    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
