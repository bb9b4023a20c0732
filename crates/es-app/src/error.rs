//! Error type for the service layer.

use std::path::PathBuf;

/// Unifies errors from the backend crates for the CLI. Display strings are
/// shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid allocation file: {0}")]
    Allocation(String),

    #[error("{0}")]
    Simulation(String),

    #[error("{0}")]
    Auth(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    History(String),

    #[error("Simulation record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<es_wizard::ValidationError> for AppError {
    fn from(err: es_wizard::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<es_wizard::WizardError> for AppError {
    fn from(err: es_wizard::WizardError) -> Self {
        AppError::Allocation(err.to_string())
    }
}

impl From<es_core::CoreError> for AppError {
    fn from(err: es_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<es_results::ResultsError> for AppError {
    fn from(err: es_results::ResultsError) -> Self {
        match err {
            es_results::ResultsError::RecordNotFound { id } => AppError::RecordNotFound(id),
            other => AppError::History(other.to_string()),
        }
    }
}

impl From<es_client::ClientError> for AppError {
    fn from(err: es_client::ClientError) -> Self {
        match err {
            es_client::ClientError::Auth { message, .. } => AppError::Auth(message),
            es_client::ClientError::NotFound { what } => AppError::RecordNotFound(what),
            other => AppError::Backend {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Backend {
            message: err.to_string(),
        }
    }
}
