//! Batch configuration shapes shared by the wizard, the run service and
//! persisted history records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingType, ConstructionPeriod};

/// Upper bound on buildings of one typology in a batch.
pub const MAX_BATCH_COUNT_PER_TYPE: u32 = 10;

/// Minimum number of buildings that makes a batch.
pub const MIN_BATCH_BUILDINGS: u32 = 2;

/// Requested number of buildings per typology (wizard step 1).
pub type BatchCounts = BTreeMap<BuildingType, u32>;

/// Buildings per typology and construction period (wizard step 2).
///
/// Serialized as `{ "single-family-house": { "1986-1995": 2 } }`.
pub type BatchAllocation = BTreeMap<BuildingType, BTreeMap<ConstructionPeriod, u32>>;

/// One archetype to simulate: every building of the same typology and period
/// shares a single simulation result, scaled by `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationJob {
    pub building_type: BuildingType,
    pub period_id: ConstructionPeriod,
    pub count: u32,
}

/// Saturating sum, so an oversized count can never wrap into a small one.
fn saturating_total<'a>(counts: impl IntoIterator<Item = &'a u32>) -> u32 {
    counts
        .into_iter()
        .fold(0u32, |acc, count| acc.saturating_add(*count))
}

pub fn total_buildings(counts: &BatchCounts) -> u32 {
    saturating_total(counts.values())
}

/// Buildings allocated across all periods of one typology.
pub fn allocated_for(allocation: &BatchAllocation, building_type: BuildingType) -> u32 {
    allocation
        .get(&building_type)
        .map(|periods| saturating_total(periods.values()))
        .unwrap_or(0)
}

/// Per-typology totals implied by an allocation, omitting empty typologies.
pub fn counts_from_allocation(allocation: &BatchAllocation) -> BatchCounts {
    allocation
        .iter()
        .map(|(bt, periods)| (*bt, saturating_total(periods.values())))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Human summary such as "2 SFH + 1 MFD"; "Various" when empty.
pub fn summarize_allocation(allocation: &BatchAllocation) -> String {
    let parts: Vec<String> = counts_from_allocation(allocation)
        .into_iter()
        .map(|(bt, count)| format!("{} {}", count, bt.short_label()))
        .collect();
    if parts.is_empty() {
        "Various".to_string()
    } else {
        parts.join(" + ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchAllocation {
        let mut allocation = BatchAllocation::new();
        allocation
            .entry(BuildingType::MidRiseApartment)
            .or_default()
            .insert(ConstructionPeriod::From1996To2005, 1);
        allocation
            .entry(BuildingType::SingleFamilyHouse)
            .or_default()
            .insert(ConstructionPeriod::From1986To1995, 2);
        allocation
    }

    #[test]
    fn allocation_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["single-family-house"]["1986-1995"], 2);
        assert_eq!(json["mid-rise-apartment"]["1996-2005"], 1);

        let back: BatchAllocation = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn counts_and_summary() {
        let allocation = sample();
        let counts = counts_from_allocation(&allocation);
        assert_eq!(total_buildings(&counts), 3);
        assert_eq!(allocated_for(&allocation, BuildingType::SingleFamilyHouse), 2);
        assert_eq!(allocated_for(&allocation, BuildingType::Office), 0);
        assert_eq!(summarize_allocation(&allocation), "2 SFH + 1 MFD");
        assert_eq!(summarize_allocation(&BatchAllocation::new()), "Various");
    }

    #[test]
    fn oversized_counts_saturate() {
        let mut allocation = BatchAllocation::new();
        let periods = allocation.entry(BuildingType::SingleFamilyHouse).or_default();
        periods.insert(ConstructionPeriod::From1986To1995, u32::MAX);
        periods.insert(ConstructionPeriod::From1996To2005, 11);

        assert_eq!(allocated_for(&allocation, BuildingType::SingleFamilyHouse), u32::MAX);
        let counts = counts_from_allocation(&allocation);
        assert_eq!(counts[&BuildingType::SingleFamilyHouse], u32::MAX);
        assert_eq!(total_buildings(&counts), u32::MAX);
    }
}
