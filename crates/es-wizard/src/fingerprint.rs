//! Content hash of a run plan.

use sha2::{Digest, Sha256};

use crate::plan::RunPlan;

/// Hex SHA-256 of the plan's JSON form. Equal plans hash equally because
/// every map in a plan is ordered.
pub fn fingerprint_plan(plan: &RunPlan) -> Result<String, serde_json::Error> {
    let plan_json = serde_json::to_vec(plan)?;
    let mut hasher = Sha256::new();
    hasher.update(&plan_json);
    Ok(format!("{:x}", hasher.finalize()))
}
