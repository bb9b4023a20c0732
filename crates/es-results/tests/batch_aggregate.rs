use es_core::{BuildingType, ConstructionPeriod, HOURS_PER_YEAR, MONTH_DAYS, month_hour_ranges};
use es_results::series::{monthly_by_building_type, monthly_totals};
use es_results::{AnnualResult, BatchResultEntry, HourlyPowerData, aggregate_batch, combined_hourly};
use proptest::prelude::*;

fn entry(
    building_type: BuildingType,
    period_id: ConstructionPeriod,
    count: u32,
    total: f64,
    floor_area: f64,
) -> BatchResultEntry {
    BatchResultEntry {
        building_type,
        period_id,
        count,
        annual: AnnualResult {
            total,
            floor_area,
            ..AnnualResult::default()
        },
        hourly: None,
    }
}

fn flat_hourly(heating: f64, cooling: f64) -> HourlyPowerData {
    HourlyPowerData {
        heating_power_kw: vec![heating; HOURS_PER_YEAR],
        cooling_power_kw: vec![cooling; HOURS_PER_YEAR],
        total_power_kw: vec![heating + cooling; HOURS_PER_YEAR],
    }
}

#[test]
fn mixed_batch_weighted_eui() {
    let entries = vec![
        entry(
            BuildingType::SingleFamilyHouse,
            ConstructionPeriod::From1986To1995,
            2,
            10000.0,
            125.0,
        ),
        entry(
            BuildingType::MidRiseApartment,
            ConstructionPeriod::From1996To2005,
            1,
            40000.0,
            3135.0,
        ),
    ];
    let agg = aggregate_batch(&entries);
    assert_eq!(agg.total, 60000.0);
    assert_eq!(agg.floor_area, 3385.0);
    assert_eq!(agg.building_count, 3);
    assert!((agg.weighted_eui - 60000.0 / 3385.0).abs() < 1e-12);
    assert!((agg.weighted_eui - 17.7).abs() < 0.05);
}

#[test]
fn combined_series_skip_entries_without_hourly() {
    let mut sfh = entry(
        BuildingType::SingleFamilyHouse,
        ConstructionPeriod::From1986To1995,
        2,
        0.0,
        0.0,
    );
    sfh.hourly = Some(flat_hourly(1.0, 0.25));
    let mfd = entry(
        BuildingType::MidRiseApartment,
        ConstructionPeriod::From1996To2005,
        1,
        0.0,
        0.0,
    );

    let combined = combined_hourly(&[sfh.clone(), mfd]);
    assert_eq!(combined.heating_kw.len(), HOURS_PER_YEAR);
    assert_eq!(combined.cooling_kw.len(), HOURS_PER_YEAR);
    assert!(combined.heating_kw.iter().all(|v| *v == 2.0));
    assert!(combined.total_kw.iter().all(|v| *v == 2.5));

    let by_type = monthly_by_building_type(&[sfh]);
    assert_eq!(by_type.len(), 1);
    let split = &by_type[&BuildingType::SingleFamilyHouse];
    assert_eq!(split.heating[0], 2.0 * 744.0);
    assert_eq!(split.cooling[1], 2.0 * 0.25 * 672.0);
}

#[test]
fn month_ranges_partition_the_year() {
    let ranges = month_hour_ranges();
    assert_eq!(ranges[0].start, 0);
    for m in 0..12 {
        assert_eq!(ranges[m].len(), MONTH_DAYS[m] * 24);
        if m > 0 {
            assert_eq!(ranges[m].start, ranges[m - 1].end);
        }
    }
    assert_eq!(ranges[11].end, HOURS_PER_YEAR);
}

proptest! {
    #[test]
    fn weighted_eui_is_total_over_area(
        rows in prop::collection::vec((0u32..=10, 0.0f64..1e6, 0.0f64..5000.0), 0..8)
    ) {
        let entries: Vec<_> = rows
            .iter()
            .map(|(count, total, area)| {
                let period = ConstructionPeriod::Before1961;
                entry(BuildingType::SingleFamilyHouse, period, *count, *total, *area)
            })
            .collect();
        let agg = aggregate_batch(&entries);
        if agg.floor_area > 0.0 {
            let tolerance = 1e-9 * agg.weighted_eui.abs().max(1.0);
            prop_assert!((agg.weighted_eui - agg.total / agg.floor_area).abs() <= tolerance);
        } else {
            prop_assert_eq!(agg.weighted_eui, 0.0);
        }
        prop_assert_eq!(agg.building_count, rows.iter().map(|r| r.0).sum::<u32>());
    }

    #[test]
    fn combined_heating_is_count_weighted_sum(
        rows in prop::collection::vec((1u32..=10, 0.0f64..50.0, 0.0f64..50.0), 1..5)
    ) {
        let entries: Vec<_> = rows
            .iter()
            .map(|(count, h, c)| {
                let period = ConstructionPeriod::From1961To1975;
                let mut e = entry(BuildingType::MidRiseApartment, period, *count, 0.0, 0.0);
                e.hourly = Some(flat_hourly(*h, *c));
                e
            })
            .collect();
        let combined = combined_hourly(&entries);
        let expected: f64 = rows.iter().map(|(n, h, _)| f64::from(*n) * h).sum();
        prop_assert_eq!(combined.heating_kw.len(), HOURS_PER_YEAR);
        prop_assert!((combined.heating_kw[100] - expected).abs() < 1e-9);
    }

    #[test]
    fn monthly_totals_conserve_energy(
        series in prop::collection::vec(0.0f64..100.0, HOURS_PER_YEAR)
    ) {
        let total: f64 = series.iter().sum();
        let monthly: f64 = monthly_totals(&series).iter().sum();
        prop_assert!((total - monthly).abs() < 1e-6 * total.max(1.0));
    }
}
