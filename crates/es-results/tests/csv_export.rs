use chrono::{TimeZone, Utc};
use es_core::{BuildingType, ConstructionPeriod, HOURS_PER_YEAR, SimulationMode};
use es_results::export::{
    SingleRunKind, SingleRunReport, batch_csv, batch_file_name, record_csv, record_file_name,
    single_run_csv, single_run_file_name,
};
use es_results::{AnnualResult, BatchResultEntry, HourlyPowerData, SimulationRecord};

fn sample_annual() -> AnnualResult {
    AnnualResult {
        heating: 5000.4,
        cooling: 1200.6,
        total: 9000.9,
        eui: 45.2,
        floor_area: 125.0,
        peak_heating_kw: 4.125,
        ..AnnualResult::default()
    }
}

fn section<'a>(csv: &'a str, title: &str) -> Vec<&'a str> {
    csv.lines()
        .skip_while(|line| *line != title)
        .skip(1)
        .take_while(|line| !line.is_empty())
        .collect()
}

#[test]
fn single_run_sections_and_rounding() {
    let annual = sample_annual();
    let report = SingleRunReport {
        building_type: BuildingType::SingleFamilyHouse,
        station_id: "lund",
        kind: SingleRunKind::PreConfigured(ConstructionPeriod::From1986To1995),
        annual: &annual,
        hourly: None,
        generated: Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap(),
    };
    let csv = single_run_csv(&report);

    assert!(csv.starts_with(
        "Building Energy Simulation Results\nGenerated,2025-03-01T10:15:00.000Z\n\n"
    ));
    assert!(csv.contains("Building Type,single family house\n"));
    assert!(csv.contains("Construction Period,1986-1995\n"));
    assert!(csv.contains("Conditioned Floor Area,125 m²\n"));

    let summary = section(&csv, "ANNUAL SUMMARY");
    assert_eq!(summary[0], "Total Energy,9001,kWh/year");
    assert_eq!(summary[1], "EUI,45.2,kWh/m²/year");
    assert_eq!(summary[2], "Peak Heating Power,4.13,kW");
    assert_eq!(summary[3], "Peak Cooling Power,0.00,kW");

    let breakdown = section(&csv, "ENERGY BREAKDOWN");
    assert_eq!(breakdown[0], "Heating,5000,kWh/year");
    assert_eq!(breakdown[1], "Cooling,1201,kWh/year");
    assert_eq!(breakdown.len(), 5);

    assert_eq!(section(&csv, "MONTHLY HEATING & COOLING (kWh)"), vec!["Month,Heating,Cooling"]);
    assert!(!csv.contains("HOURLY DATA"));
}

#[test]
fn single_run_hourly_table() {
    let annual = sample_annual();
    let hourly = HourlyPowerData {
        heating_power_kw: vec![1.0; HOURS_PER_YEAR],
        cooling_power_kw: vec![0.0005; HOURS_PER_YEAR],
        total_power_kw: Vec::new(),
    };
    let report = SingleRunReport {
        building_type: BuildingType::MidRiseApartment,
        station_id: "unknown-station",
        kind: SingleRunKind::Custom,
        annual: &annual,
        hourly: Some(&hourly),
        generated: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    };
    let csv = single_run_csv(&report);

    assert!(csv.contains("Weather Location,unknown-station\n"));
    assert!(csv.contains("Simulation Type,Custom Real-Time\n"));
    assert!(csv.contains("Jan,744,0\n"));
    assert!(csv.contains("Feb,672,0\n"));

    let hourly_rows = section(&csv, "HOURLY DATA (8760 hours)");
    assert_eq!(hourly_rows.len(), HOURS_PER_YEAR + 1);
    assert_eq!(hourly_rows[1], "0,1.000,0.001");
    assert_eq!(hourly_rows[HOURS_PER_YEAR], "8759,1.000,0.001");
}

#[test]
fn short_cooling_series_pads_with_bare_zero() {
    let annual = sample_annual();
    let hourly = HourlyPowerData {
        heating_power_kw: vec![1.5, 2.0, 3.0],
        cooling_power_kw: vec![0.0],
        total_power_kw: Vec::new(),
    };
    let report = SingleRunReport {
        building_type: BuildingType::SingleFamilyHouse,
        station_id: "lund",
        kind: SingleRunKind::Custom,
        annual: &annual,
        hourly: Some(&hourly),
        generated: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    };
    let csv = single_run_csv(&report);
    let rows = section(&csv, "HOURLY DATA (8760 hours)");
    assert_eq!(
        rows,
        [
            "Hour,Heating Power (kW),Cooling Power (kW)",
            "0,1.500,0.000",
            "1,2.000,0",
            "2,3.000,0",
        ]
    );
}

#[test]
fn batch_report_rows_and_totals() {
    let entries = vec![
        BatchResultEntry {
            building_type: BuildingType::SingleFamilyHouse,
            period_id: ConstructionPeriod::From1986To1995,
            count: 2,
            annual: AnnualResult {
                total: 10000.0,
                floor_area: 125.0,
                ..AnnualResult::default()
            },
            hourly: None,
        },
        BatchResultEntry {
            building_type: BuildingType::MidRiseApartment,
            period_id: ConstructionPeriod::From1996To2005,
            count: 1,
            annual: AnnualResult {
                total: 40000.0,
                floor_area: 3135.0,
                eui: 12.76,
                ..AnnualResult::default()
            },
            hourly: None,
        },
    ];
    let csv = batch_csv("lund", &entries, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Batch Simulation Results");
    assert_eq!(lines[3], "");
    assert_eq!(lines[4], "PER-BUILDING RESULTS");
    assert_eq!(lines[6], "single-family-house,1986-1995,2,0,0,0,0,0,20000,0.0,250,0.00,0.00");
    assert_eq!(lines[7], "mid-rise-apartment,1996-2005,1,0,0,0,0,0,40000,12.8,3135,0.00,0.00");
    assert_eq!(lines[8], "");
    assert_eq!(lines[9], "TOTAL,,3,0,0,0,0,0,60000,17.7,3385,0.00,0.00");
    assert!(!csv.contains("HOURLY"));
    assert_eq!(batch_file_name("lund"), "batch_results_lund.csv");
}

#[test]
fn empty_batch_total_eui_is_plain_zero() {
    let csv = batch_csv("lund", &[], Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    assert!(csv.ends_with("TOTAL,,0,0,0,0,0,0,0,0,0,0.00,0.00\n"));
}

#[test]
fn record_report_and_file_name() {
    let record = SimulationRecord {
        id: "7f0c2a1e-1111-2222-3333-444455556666".to_string(),
        user_id: "alice".to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap(),
        simulation_type: SimulationMode::PreConfigured,
        building_type: Some(BuildingType::SingleFamilyHouse),
        weather_station: "lund".to_string(),
        construction_period: Some(ConstructionPeriod::From1986To1995),
        batch_config: None,
        building_count: 1,
        total_heating: 5000.5,
        total_cooling: 1200.0,
        total_energy: 9000.0,
        eui: 72.0,
        floor_area: 125.0,
        results_json: serde_json::Value::Null,
        hourly_data: Some(HourlyPowerData {
            heating_power_kw: vec![1.5, 2.0],
            cooling_power_kw: vec![0.25, 0.0],
            total_power_kw: Vec::new(),
        }),
    };
    let csv = record_csv(&record);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Simulation Report");
    assert_eq!(lines[1], "Date,2025-03-01 10:15:00");
    assert_eq!(lines[2], "Type,pre-configured");
    assert_eq!(lines[3], "Location,lund");
    assert_eq!(lines[4], "Building Type,single-family-house");
    assert_eq!(lines[5], "Construction Period,1986-1995");
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], "Annual Results");
    assert_eq!(lines[8], "Total Heating (kWh),5000.5");
    assert_eq!(lines[10], "Total Energy (kWh),9000");
    assert_eq!(lines[14], "Hourly Data (8760 hours)");
    assert_eq!(lines[16], "1,1.5000,0.2500");
    assert_eq!(lines[17], "2,2.0000,0.0000");
    assert!(!csv.contains("Building Count"));
    assert!(!csv.ends_with('\n'));

    assert_eq!(record_file_name(&record), "simulation-7f0c2a1e-2025-03-01.csv");
    assert_eq!(
        single_run_file_name("lund", SingleRunKind::PreConfigured(ConstructionPeriod::Before1961)),
        "energy_results_lund_before-1961.csv"
    );
    assert_eq!(
        single_run_file_name("kiruna", SingleRunKind::Custom),
        "energy_results_kiruna_custom.csv"
    );
}
