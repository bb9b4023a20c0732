//! es-wizard: the four-step simulation wizard, its gating rules, the
//! dependency table that clears stale results and the batch job builder.

pub mod fingerprint;
pub mod invalidation;
pub mod jobs;
pub mod plan;
pub mod schema;
pub mod state;
pub mod validate;

pub use fingerprint::fingerprint_plan;
pub use invalidation::{Derived, Field, INVALIDATION_TABLE, invalidated_by};
pub use jobs::build_jobs;
pub use plan::{RunPlan, RunTicket};
pub use schema::{Step, WizardConfig};
pub use state::{DerivedResults, StepTransition, WizardState};
pub use validate::{ValidationError, validate_allocation, validate_step};

use es_core::BatchAllocation;
use std::path::Path;

pub type WizardResult<T> = Result<T, WizardError>;

#[derive(thiserror::Error, Debug)]
pub enum WizardError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_allocation_yaml(path: &Path) -> WizardResult<BatchAllocation> {
    let content = std::fs::read_to_string(path)?;
    let allocation: BatchAllocation = serde_yaml::from_str(&content)?;
    validate_allocation(&allocation)?;
    Ok(allocation)
}

pub fn load_allocation_json(path: &Path) -> WizardResult<BatchAllocation> {
    let content = std::fs::read_to_string(path)?;
    let allocation: BatchAllocation = serde_json::from_str(&content)?;
    validate_allocation(&allocation)?;
    Ok(allocation)
}

/// Loads a `{ building-type: { period: count } }` file; `.json` is read as
/// JSON, anything else as YAML.
pub fn load_allocation(path: &Path) -> WizardResult<BatchAllocation> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_allocation_json(path),
        _ => load_allocation_yaml(path),
    }
}

pub fn save_allocation_yaml(path: &Path, allocation: &BatchAllocation) -> WizardResult<()> {
    validate_allocation(allocation)?;
    std::fs::write(path, serde_yaml::to_string(allocation)?)?;
    Ok(())
}
