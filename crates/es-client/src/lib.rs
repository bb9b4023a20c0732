//! es-client: HTTP clients for the simulation service and the hosted
//! auth/row-store backend.

pub mod auth;
pub mod error;
pub mod rows;
pub mod simulation;

pub use auth::{AuthClient, Session, SignUpOutcome, User};
pub use error::{ClientError, ClientResult};
pub use rows::{FeedbackEntry, RowStoreClient};
pub use simulation::{CustomRequest, HttpSimulationClient, PresetRequest, SimulationBackend};

use std::time::Duration;

/// Shared HTTP client; no timeout unless one is configured.
pub(crate) fn build_http(timeout: Option<Duration>) -> ClientResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
