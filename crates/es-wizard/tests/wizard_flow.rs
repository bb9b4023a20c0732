use es_core::{BuildingType, ConstructionPeriod, SimulationMode};
use es_results::{AnnualResult, BatchResultEntry, SimulationResponse};
use es_wizard::*;

fn response(total: f64) -> SimulationResponse {
    SimulationResponse {
        annual: AnnualResult {
            total,
            ..AnnualResult::default()
        },
        hourly: None,
        cached: false,
    }
}

fn batch_entry() -> BatchResultEntry {
    BatchResultEntry {
        building_type: BuildingType::SingleFamilyHouse,
        period_id: ConstructionPeriod::From1986To1995,
        count: 2,
        annual: AnnualResult::default(),
        hourly: None,
    }
}

fn configured_batch() -> WizardState {
    let mut wizard = WizardState::new();
    wizard.set_mode(SimulationMode::Batch);
    wizard.set_batch_count(BuildingType::SingleFamilyHouse, 2).unwrap();
    wizard.set_batch_count(BuildingType::MidRiseApartment, 1).unwrap();
    wizard.set_batch_period(
        BuildingType::SingleFamilyHouse,
        ConstructionPeriod::From1986To1995,
        2,
    );
    wizard.set_batch_period(
        BuildingType::MidRiseApartment,
        ConstructionPeriod::From1996To2005,
        1,
    );
    wizard
}

#[test]
fn load_batch_rejects_counts_that_would_wrap() {
    let mut allocation = es_core::BatchAllocation::new();
    let periods = allocation.entry(BuildingType::SingleFamilyHouse).or_default();
    periods.insert(ConstructionPeriod::From1986To1995, u32::MAX);
    periods.insert(ConstructionPeriod::From1996To2005, 11);

    let mut wizard = WizardState::new();
    let err = wizard.load_batch(allocation).unwrap_err();
    assert!(matches!(err, ValidationError::BatchCountOutOfRange { .. }));
    assert_eq!(wizard.config().mode, SimulationMode::PreConfigured);
    assert!(wizard.config().batch_periods.is_empty());
    assert_eq!(wizard.step(), Step::Typology);
}

#[test]
fn load_batch_accepts_a_valid_allocation() {
    let mut allocation = es_core::BatchAllocation::new();
    allocation
        .entry(BuildingType::SingleFamilyHouse)
        .or_default()
        .insert(ConstructionPeriod::From1986To1995, 2);

    let mut wizard = WizardState::new();
    wizard.load_batch(allocation).unwrap();
    assert_eq!(wizard.config().mode, SimulationMode::Batch);
    assert_eq!(wizard.config().batch_counts[&BuildingType::SingleFamilyHouse], 2);
}

#[test]
fn preset_flow_runs_from_step_three() {
    let mut wizard = WizardState::new();
    assert_eq!(wizard.step(), Step::Typology);
    assert_eq!(wizard.next_step().unwrap(), StepTransition::Advanced(Step::BuildingInfo));
    assert_eq!(wizard.next_step().unwrap(), StepTransition::Advanced(Step::DesignParameters));

    let StepTransition::Run(ticket) = wizard.next_step().unwrap() else {
        panic!("leaving step 3 should start a run");
    };
    assert_eq!(wizard.step(), Step::Results);
    assert_eq!(ticket.plan.mode(), SimulationMode::PreConfigured);

    assert!(wizard.apply_single(&ticket, response(9000.0)));
    assert_eq!(
        wizard.results().pre_configured.as_ref().map(|r| r.annual.total),
        Some(9000.0)
    );
    assert_eq!(wizard.next_step().unwrap(), StepTransition::Stayed(Step::Results));
}

#[test]
fn prev_step_never_goes_below_one() {
    let mut wizard = WizardState::new();
    assert_eq!(wizard.prev_step(), Step::Typology);
    wizard.next_step().unwrap();
    assert_eq!(wizard.prev_step(), Step::Typology);
}

#[test]
fn batch_gating_blocks_incomplete_allocation() {
    let mut wizard = WizardState::new();
    wizard.set_mode(SimulationMode::Batch);
    wizard.set_batch_count(BuildingType::SingleFamilyHouse, 1).unwrap();
    assert!(!wizard.can_proceed());
    assert!(matches!(
        wizard.next_step(),
        Err(ValidationError::BatchTooSmall { total: 1, min: 2 })
    ));

    wizard.set_batch_count(BuildingType::SingleFamilyHouse, 2).unwrap();
    assert!(wizard.set_batch_count(BuildingType::MidRiseApartment, 11).is_err());
    wizard.next_step().unwrap();

    assert!(!wizard.can_proceed());
    wizard.set_batch_period(BuildingType::SingleFamilyHouse, ConstructionPeriod::Before1961, 1);
    assert!(!wizard.can_proceed());
    wizard.set_batch_period(BuildingType::SingleFamilyHouse, ConstructionPeriod::From1996To2005, 1);
    assert!(wizard.can_proceed());
}

#[test]
fn batch_run_builds_jobs_in_order() {
    let mut wizard = configured_batch();
    wizard.go_to(Step::DesignParameters);
    let StepTransition::Run(ticket) = wizard.next_step().unwrap() else {
        panic!("expected a run");
    };
    let RunPlan::Batch { jobs, .. } = &ticket.plan else {
        panic!("expected a batch plan");
    };
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].building_type, BuildingType::SingleFamilyHouse);
    assert_eq!(jobs[1].count, 1);
}

#[test]
fn weather_change_clears_batch_results_but_keeps_counts() {
    let mut wizard = configured_batch();
    wizard.go_to(Step::DesignParameters);
    let StepTransition::Run(ticket) = wizard.next_step().unwrap() else {
        panic!("expected a run");
    };
    assert!(wizard.apply_batch(&ticket, vec![batch_entry()]));

    wizard.go_to(Step::BuildingInfo);
    let counts_before = wizard.config().batch_counts.clone();
    wizard.set_weather_station("kiruna");

    assert!(wizard.results().batch.is_none());
    assert_eq!(wizard.config().batch_counts, counts_before);
}

#[test]
fn stale_result_is_discarded() {
    let mut wizard = WizardState::new();
    wizard.go_to(Step::DesignParameters);
    let StepTransition::Run(ticket) = wizard.next_step().unwrap() else {
        panic!("expected a run");
    };

    wizard.set_construction_period(ConstructionPeriod::Before1961);
    assert!(!wizard.apply_single(&ticket, response(1.0)));
    assert!(wizard.results().pre_configured.is_none());
}

#[test]
fn field_changes_follow_the_table() {
    let mut wizard = WizardState::new();
    wizard.go_to(Step::DesignParameters);
    let StepTransition::Run(preset) = wizard.next_step().unwrap() else {
        panic!("expected a run");
    };
    assert!(wizard.apply_single(&preset, response(1.0)));

    // Custom parameters only invalidate the custom result.
    let mut params = wizard.config().custom;
    params.wall_u = 0.5;
    wizard.set_custom_parameters(params);
    assert!(wizard.results().pre_configured.is_some());

    wizard.set_building_type(BuildingType::MidRiseApartment);
    assert!(wizard.results().pre_configured.is_none());
    assert_eq!(wizard.config().custom.heated_floor_area, 3135.0);
    assert_eq!(wizard.config().custom.number_of_floors, 4);
    assert_eq!(wizard.config().custom.wwr, 20);
}

#[test]
fn leaving_batch_mode_clears_batch_inputs() {
    let mut wizard = configured_batch();
    wizard.set_mode(SimulationMode::RealTime);
    assert!(wizard.config().batch_counts.is_empty());
    assert!(wizard.config().batch_periods.is_empty());
}

#[test]
fn lowering_a_count_to_zero_prunes_its_periods() {
    let mut wizard = configured_batch();
    wizard.set_batch_count(BuildingType::MidRiseApartment, 0).unwrap();
    assert!(!wizard.config().batch_periods.contains_key(&BuildingType::MidRiseApartment));
    assert!(wizard.config().batch_periods.contains_key(&BuildingType::SingleFamilyHouse));
}

#[test]
fn batch_ticket_does_not_fill_single_slots() {
    let mut wizard = configured_batch();
    wizard.go_to(Step::DesignParameters);
    let StepTransition::Run(ticket) = wizard.next_step().unwrap() else {
        panic!("expected a run");
    };
    assert!(!wizard.apply_single(&ticket, response(1.0)));
    assert!(wizard.results().is_empty());
}
