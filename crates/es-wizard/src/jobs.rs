//! Batch expansion into one simulation job per archetype.

use es_core::{BatchAllocation, SimulationJob};

/// One job per (building type, period) with a positive count, in building
/// type display order then chronological period order.
pub fn build_jobs(allocation: &BatchAllocation) -> Vec<SimulationJob> {
    allocation
        .iter()
        .flat_map(|(&building_type, periods)| {
            periods
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(move |(&period_id, &count)| SimulationJob {
                    building_type,
                    period_id,
                    count,
                })
        })
        .collect()
}
