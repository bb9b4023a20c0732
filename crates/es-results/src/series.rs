//! Monthly and daily reductions of hourly power series.
//!
//! Hourly kW summed over an hour range gives kWh for that range.

use std::collections::BTreeMap;

use es_core::{BuildingType, DAYS_PER_YEAR, MONTH_NAMES, month_hour_ranges, round_half_up};
use serde::{Deserialize, Serialize};

use crate::types::{BatchResultEntry, HourlyPowerData};

/// Sum of `series` over each calendar month; hours past the end count as zero.
pub fn monthly_totals(series: &[f64]) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for (month, range) in month_hour_ranges().into_iter().enumerate() {
        let end = range.end.min(series.len());
        if range.start < end {
            totals[month] = series[range.start..end].iter().sum();
        }
    }
    totals
}

/// One row of the monthly heating/cooling table, rounded to whole kWh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyEnergy {
    pub month: &'static str,
    pub heating: i64,
    pub cooling: i64,
}

/// Monthly heating and cooling energy; empty without both hourly series.
pub fn monthly_energy(hourly: Option<&HourlyPowerData>) -> Vec<MonthlyEnergy> {
    let Some(hourly) = hourly.filter(|h| h.has_heating_and_cooling()) else {
        return Vec::new();
    };
    let heating = monthly_totals(&hourly.heating_power_kw);
    let cooling = monthly_totals(&hourly.cooling_power_kw);
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(m, month)| MonthlyEnergy {
            month: *month,
            heating: round_half_up(heating[m]),
            cooling: round_half_up(cooling[m]),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlySplit {
    pub heating: [f64; 12],
    pub cooling: [f64; 12],
}

/// Count-weighted monthly heating and cooling per building type.
///
/// Types whose entries carry no hourly data are absent from the map.
pub fn monthly_by_building_type(
    entries: &[BatchResultEntry],
) -> BTreeMap<BuildingType, MonthlySplit> {
    let mut by_type: BTreeMap<BuildingType, MonthlySplit> = BTreeMap::new();
    for entry in entries {
        let Some(hourly) = entry.hourly.as_ref().filter(|h| h.has_heating_and_cooling()) else {
            continue;
        };
        let n = f64::from(entry.count);
        let heating = monthly_totals(&hourly.heating_power_kw);
        let cooling = monthly_totals(&hourly.cooling_power_kw);
        let split = by_type.entry(entry.building_type).or_default();
        for m in 0..12 {
            split.heating[m] += heating[m] * n;
            split.cooling[m] += cooling[m] * n;
        }
    }
    by_type
}

/// Daily maximum of an hourly series (365 values, floored at 0).
pub fn daily_peaks(series: &[f64]) -> Vec<f64> {
    (0..DAYS_PER_YEAR)
        .map(|day| {
            let start = (day * 24).min(series.len());
            let end = (day * 24 + 24).min(series.len());
            series[start..end].iter().copied().fold(0.0, f64::max)
        })
        .collect()
}
