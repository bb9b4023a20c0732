//! Batch aggregation: count-weighted annual totals and combined hourly power.

use es_core::{HOURS_PER_YEAR, units};
use serde::{Deserialize, Serialize};

use crate::types::BatchResultEntry;

/// Count-weighted totals over every entry of a batch.
///
/// Fans are summed into `fans` only; `total` is the sum of the reported
/// per-archetype totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchAggregate {
    pub heating: f64,
    pub cooling: f64,
    pub dhw: f64,
    pub lighting: f64,
    pub equipment: f64,
    pub fans: f64,
    pub total: f64,
    pub floor_area: f64,
    pub peak_heating_kw: f64,
    pub peak_cooling_kw: f64,
    pub peak_power_kw: f64,
    pub building_count: u32,
    /// `total / floor_area`, or 0 for a batch without floor area.
    pub weighted_eui: f64,
}

pub fn aggregate_batch(entries: &[BatchResultEntry]) -> BatchAggregate {
    let mut agg = BatchAggregate::default();
    for entry in entries {
        let n = f64::from(entry.count);
        let a = &entry.annual;
        agg.heating += a.heating * n;
        agg.cooling += a.cooling * n;
        agg.dhw += a.dhw * n;
        agg.lighting += a.lighting * n;
        agg.equipment += a.equipment * n;
        agg.fans += a.fans * n;
        agg.total += a.total * n;
        agg.floor_area += a.floor_area * n;
        agg.peak_heating_kw += a.peak_heating_kw * n;
        agg.peak_cooling_kw += a.peak_cooling_kw * n;
        agg.peak_power_kw += a.peak_power_kw * n;
        agg.building_count = agg.building_count.saturating_add(entry.count);
    }
    agg.weighted_eui = units::eui(units::kwh(agg.total), units::m2(agg.floor_area));
    agg
}

/// Combined hourly power of a batch, always `HOURS_PER_YEAR` long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedHourly {
    pub heating_kw: Vec<f64>,
    pub cooling_kw: Vec<f64>,
    pub total_kw: Vec<f64>,
}

impl Default for CombinedHourly {
    fn default() -> Self {
        Self {
            heating_kw: vec![0.0; HOURS_PER_YEAR],
            cooling_kw: vec![0.0; HOURS_PER_YEAR],
            total_kw: vec![0.0; HOURS_PER_YEAR],
        }
    }
}

/// Sums `count`-scaled heating and cooling series hour by hour.
///
/// Entries without both series contribute nothing. Series shorter than a
/// year contribute their available hours; extra hours are ignored.
pub fn combined_hourly(entries: &[BatchResultEntry]) -> CombinedHourly {
    let mut combined = CombinedHourly::default();
    for entry in entries {
        let Some(hourly) = entry.hourly.as_ref().filter(|h| h.has_heating_and_cooling()) else {
            continue;
        };
        let n = f64::from(entry.count);
        let len = hourly.heating_power_kw.len().min(HOURS_PER_YEAR);
        for h in 0..len {
            combined.heating_kw[h] += hourly.heating_power_kw[h] * n;
            combined.cooling_kw[h] += hourly.cooling_power_kw.get(h).copied().unwrap_or(0.0) * n;
        }
    }
    for h in 0..HOURS_PER_YEAR {
        combined.total_kw[h] = combined.heating_kw[h] + combined.cooling_kw[h];
    }
    combined
}
