//! CSV reports for single runs, batches and saved history records.
//!
//! Energies are whole kWh (half-up), EUI has one decimal, peak powers two,
//! hourly power three (four in history reports).

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use es_core::{
    BuildingType, ConstructionPeriod, HOURS_PER_YEAR, round_half_up, station_name, to_fixed,
};

use crate::aggregate::aggregate_batch;
use crate::series::monthly_energy;
use crate::types::{AnnualResult, BatchResultEntry, HourlyPowerData, SimulationRecord};

/// Which single-run flavour produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleRunKind {
    PreConfigured(ConstructionPeriod),
    Custom,
}

pub struct SingleRunReport<'a> {
    pub building_type: BuildingType,
    pub station_id: &'a str,
    pub kind: SingleRunKind,
    pub annual: &'a AnnualResult,
    pub hourly: Option<&'a HourlyPowerData>,
    pub generated: DateTime<Utc>,
}

fn iso_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn single_run_csv(report: &SingleRunReport<'_>) -> String {
    let a = report.annual;
    let mut csv = String::new();

    csv.push_str("Building Energy Simulation Results\n");
    let _ = writeln!(csv, "Generated,{}\n", iso_timestamp(report.generated));

    csv.push_str("CONFIGURATION\n");
    let _ = writeln!(csv, "Building Type,{}", report.building_type.id().replace('-', " "));
    let _ = writeln!(csv, "Weather Location,{}", station_name(report.station_id));
    match report.kind {
        SingleRunKind::PreConfigured(period) => {
            let _ = writeln!(csv, "Construction Period,{}", period.id());
        }
        SingleRunKind::Custom => csv.push_str("Simulation Type,Custom Real-Time\n"),
    }
    let _ = writeln!(csv, "Conditioned Floor Area,{} m²\n", a.floor_area);

    csv.push_str("ANNUAL SUMMARY\n");
    let _ = writeln!(csv, "Total Energy,{},kWh/year", round_half_up(a.total));
    let _ = writeln!(csv, "EUI,{},kWh/m²/year", to_fixed(a.eui, 1));
    let _ = writeln!(csv, "Peak Heating Power,{},kW", to_fixed(a.peak_heating_kw, 2));
    let _ = writeln!(csv, "Peak Cooling Power,{},kW\n", to_fixed(a.peak_cooling_kw, 2));

    csv.push_str("ENERGY BREAKDOWN\n");
    for (label, value) in [
        ("Heating", a.heating),
        ("Cooling", a.cooling),
        ("DHW", a.dhw),
        ("Lighting", a.lighting),
        ("Equipment", a.equipment),
    ] {
        let _ = writeln!(csv, "{label},{},kWh/year", round_half_up(value));
    }
    csv.push('\n');

    csv.push_str("MONTHLY HEATING & COOLING (kWh)\n");
    csv.push_str("Month,Heating,Cooling\n");
    for m in monthly_energy(report.hourly) {
        let _ = writeln!(csv, "{},{},{}", m.month, m.heating, m.cooling);
    }
    csv.push('\n');

    if let Some(hourly) = report.hourly.filter(|h| h.has_heating_and_cooling()) {
        csv.push_str("HOURLY DATA (8760 hours)\n");
        csv.push_str("Hour,Heating Power (kW),Cooling Power (kW)\n");
        let hours = hourly.heating_power_kw.len().min(HOURS_PER_YEAR);
        for h in 0..hours {
            let _ = writeln!(
                csv,
                "{h},{},{}",
                to_fixed(hourly.heating_power_kw[h], 3),
                hourly_cell(&hourly.cooling_power_kw, h, 3)
            );
        }
    }

    csv
}

const BATCH_HEADER: &str = "Building Type,Construction Period,Count,\
Heating (kWh),Cooling (kWh),DHW (kWh),Lighting (kWh),Equipment (kWh),Total (kWh),\
EUI (kWh/m²),Floor Area (m²),Peak Heating (kW),Peak Cooling (kW)";

pub fn batch_csv(
    station_id: &str,
    entries: &[BatchResultEntry],
    generated: DateTime<Utc>,
) -> String {
    let mut csv = String::from("Batch Simulation Results\n");
    let _ = writeln!(csv, "Generated,{}", iso_timestamp(generated));
    let _ = writeln!(csv, "Weather Location,{}\n", station_name(station_id));

    csv.push_str("PER-BUILDING RESULTS\n");
    csv.push_str(BATCH_HEADER);
    csv.push('\n');

    for entry in entries {
        let a = &entry.annual;
        let n = f64::from(entry.count);
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            entry.building_type.id(),
            entry.period_id.id(),
            entry.count,
            round_half_up(a.heating * n),
            round_half_up(a.cooling * n),
            round_half_up(a.dhw * n),
            round_half_up(a.lighting * n),
            round_half_up(a.equipment * n),
            round_half_up(a.total * n),
            to_fixed(a.eui, 1),
            round_half_up(a.floor_area * n),
            to_fixed(a.peak_heating_kw * n, 2),
            to_fixed(a.peak_cooling_kw * n, 2),
        );
    }

    let agg = aggregate_batch(entries);
    let eui = if agg.floor_area > 0.0 {
        to_fixed(agg.weighted_eui, 1)
    } else {
        "0".to_string()
    };
    let _ = writeln!(
        csv,
        "\nTOTAL,,{},{},{},{},{},{},{},{},{},{},{}",
        agg.building_count,
        round_half_up(agg.heating),
        round_half_up(agg.cooling),
        round_half_up(agg.dhw),
        round_half_up(agg.lighting),
        round_half_up(agg.equipment),
        round_half_up(agg.total),
        eui,
        round_half_up(agg.floor_area),
        to_fixed(agg.peak_heating_kw, 2),
        to_fixed(agg.peak_cooling_kw, 2),
    );

    csv
}

/// Report for a saved record. Lines are joined without a trailing newline.
pub fn record_csv(record: &SimulationRecord) -> String {
    let mut lines = vec![
        "Simulation Report".to_string(),
        format!("Date,{}", record.created_at.format("%Y-%m-%d %H:%M:%S")),
        format!("Type,{}", record.simulation_type),
        format!("Location,{}", record.weather_station),
    ];
    if let Some(bt) = record.building_type {
        lines.push(format!("Building Type,{bt}"));
    }
    if let Some(period) = record.construction_period {
        lines.push(format!("Construction Period,{period}"));
    }
    if record.building_count > 1 {
        lines.push(format!("Building Count,{}", record.building_count));
    }

    lines.push(String::new());
    lines.push("Annual Results".to_string());
    lines.push(format!("Total Heating (kWh),{}", record.total_heating));
    lines.push(format!("Total Cooling (kWh),{}", record.total_cooling));
    lines.push(format!("Total Energy (kWh),{}", record.total_energy));
    lines.push(format!("EUI (kWh/m²/year),{}", record.eui));
    lines.push(format!("Floor Area (m²),{}", record.floor_area));

    if let Some(hourly) = record.hourly_data.as_ref().filter(|h| h.has_heating_and_cooling()) {
        lines.push(String::new());
        lines.push("Hourly Data (8760 hours)".to_string());
        lines.push("Hour,Heating (kW),Cooling (kW)".to_string());
        let hours = hourly.heating_power_kw.len().min(HOURS_PER_YEAR);
        for i in 0..hours {
            lines.push(format!(
                "{},{},{}",
                i + 1,
                to_fixed(hourly.heating_power_kw[i], 4),
                hourly_cell(&hourly.cooling_power_kw, i, 4)
            ));
        }
    }

    lines.join("\n")
}

/// A sample past the end of a shorter series is written as a bare `0`.
fn hourly_cell(series: &[f64], hour: usize, digits: usize) -> String {
    series
        .get(hour)
        .map_or_else(|| "0".to_string(), |v| to_fixed(*v, digits))
}

pub fn single_run_file_name(station_id: &str, kind: SingleRunKind) -> String {
    let suffix = match kind {
        SingleRunKind::PreConfigured(period) => period.id(),
        SingleRunKind::Custom => "custom",
    };
    format!("energy_results_{station_id}_{suffix}.csv")
}

pub fn batch_file_name(station_id: &str) -> String {
    format!("batch_results_{station_id}.csv")
}

pub fn record_file_name(record: &SimulationRecord) -> String {
    let id8: String = record.id.chars().take(8).collect();
    format!("simulation-{id8}-{}.csv", record.created_at.format("%Y-%m-%d"))
}
