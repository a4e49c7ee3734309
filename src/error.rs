use thiserror::Error;

/// Errors raised while running a migration.
///
/// Nothing is retried: the first error aborts the run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },
}

impl MigrationError {
    pub fn invalid_document(id: impl Into<String>, reason: impl Into<String>) -> Self {
        MigrationError::InvalidDocument {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for MigrationError {
    fn from(err: config::ConfigError) -> Self {
        MigrationError::Config(err.to_string())
    }
}
