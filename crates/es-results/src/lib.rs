//! es-results: simulation outputs, batch aggregation, CSV reports and the
//! local history store.

pub mod aggregate;
pub mod export;
pub mod series;
pub mod store;
pub mod types;

pub use aggregate::{BatchAggregate, CombinedHourly, aggregate_batch, combined_hourly};
pub use store::HistoryStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Simulation record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
