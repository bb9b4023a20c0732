//! The wizard controller: current step, inputs and the results computed
//! from them.

use es_core::{
    BatchAllocation, BatchCounts, BuildingType, ConstructionPeriod, CoreError, CoreResult,
    CustomParameters, MAX_BATCH_COUNT_PER_TYPE, SimulationMode, counts_from_allocation,
};
use es_results::{BatchResultEntry, SimulationResponse};
use tracing::{debug, warn};

use crate::invalidation::{Derived, Field, invalidated_by};
use crate::plan::RunTicket;
use crate::schema::{Step, WizardConfig};
use crate::validate::{ValidationError, validate_allocation, validate_step};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedResults {
    pub pre_configured: Option<SimulationResponse>,
    pub custom: Option<SimulationResponse>,
    pub batch: Option<Vec<BatchResultEntry>>,
}

impl DerivedResults {
    fn clear(&mut self, derived: Derived) {
        match derived {
            Derived::PreConfiguredResult => self.pre_configured = None,
            Derived::CustomResult => self.custom = None,
            Derived::BatchResults => self.batch = None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pre_configured.is_none() && self.custom.is_none() && self.batch.is_none()
    }
}

/// Outcome of a forward move.
#[derive(Debug, Clone, PartialEq)]
pub enum StepTransition {
    Advanced(Step),
    /// Left the design parameter step; the caller executes the ticket.
    Run(RunTicket),
    /// Already on the last step.
    Stayed(Step),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WizardState {
    step: Step,
    config: WizardConfig,
    results: DerivedResults,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WizardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn results(&self) -> &DerivedResults {
        &self.results
    }

    fn invalidate(&mut self, field: Field) {
        for derived in invalidated_by(field) {
            self.results.clear(*derived);
        }
        debug!(?field, "cleared dependent results");
    }

    pub fn set_mode(&mut self, mode: SimulationMode) {
        if self.config.mode == mode {
            return;
        }
        self.config.mode = mode;
        if mode != SimulationMode::Batch {
            self.config.batch_counts.clear();
            self.config.batch_periods.clear();
        }
        self.invalidate(Field::Mode);
    }

    pub fn set_building_type(&mut self, building_type: BuildingType) {
        if self.config.building_type == building_type {
            return;
        }
        self.config.building_type = building_type;
        self.config.custom.apply_building_type_defaults(building_type);
        self.invalidate(Field::BuildingType);
    }

    pub fn set_weather_station(&mut self, station: impl Into<String>) {
        let station = station.into();
        if self.config.weather_station == station {
            return;
        }
        self.config.weather_station = station;
        self.invalidate(Field::WeatherStation);
    }

    pub fn set_construction_period(&mut self, period: ConstructionPeriod) {
        if self.config.construction_period == period {
            return;
        }
        self.config.construction_period = period;
        self.invalidate(Field::ConstructionPeriod);
    }

    pub fn set_custom_parameters(&mut self, parameters: CustomParameters) {
        if self.config.custom == parameters {
            return;
        }
        self.config.custom = parameters;
        self.invalidate(Field::CustomParameters);
    }

    /// Sets the requested number of buildings of one type (0..=10).
    pub fn set_batch_count(&mut self, building_type: BuildingType, count: u32) -> CoreResult<()> {
        if count > MAX_BATCH_COUNT_PER_TYPE {
            return Err(CoreError::OutOfRange {
                what: "batch building count",
                value: f64::from(count),
                min: 0.0,
                max: f64::from(MAX_BATCH_COUNT_PER_TYPE),
            });
        }
        let mut counts = self.config.batch_counts.clone();
        if count == 0 {
            counts.remove(&building_type);
        } else {
            counts.insert(building_type, count);
        }
        self.set_batch_counts(counts);
        Ok(())
    }

    /// Replaces the batch counts and drops period allocations of types that
    /// no longer have buildings.
    pub fn set_batch_counts(&mut self, counts: BatchCounts) {
        if self.config.batch_counts == counts {
            return;
        }
        self.config.batch_counts = counts;
        let counts = &self.config.batch_counts;
        self.config
            .batch_periods
            .retain(|bt, _| counts.get(bt).copied().unwrap_or(0) > 0);
        self.invalidate(Field::BatchCounts);
    }

    pub fn set_batch_period(
        &mut self,
        building_type: BuildingType,
        period: ConstructionPeriod,
        count: u32,
    ) {
        let mut allocation = self.config.batch_periods.clone();
        let periods = allocation.entry(building_type).or_default();
        if count == 0 {
            periods.remove(&period);
        } else {
            periods.insert(period, count);
        }
        if periods.is_empty() {
            allocation.remove(&building_type);
        }
        self.set_batch_periods(allocation);
    }

    pub fn set_batch_periods(&mut self, allocation: BatchAllocation) {
        if self.config.batch_periods == allocation {
            return;
        }
        self.config.batch_periods = allocation;
        self.invalidate(Field::BatchPeriods);
    }

    /// Switches to batch mode with counts and periods taken from a complete
    /// allocation, as when loading a saved batch. The allocation is checked
    /// first; a rejected one leaves the state untouched.
    pub fn load_batch(&mut self, allocation: BatchAllocation) -> Result<(), ValidationError> {
        validate_allocation(&allocation)?;
        self.set_mode(SimulationMode::Batch);
        self.set_batch_counts(counts_from_allocation(&allocation));
        self.set_batch_periods(allocation);
        Ok(())
    }

    pub fn validate_current(&self) -> Result<(), ValidationError> {
        validate_step(&self.config, self.step)
    }

    pub fn can_proceed(&self) -> bool {
        self.validate_current().is_ok()
    }

    pub fn next_step(&mut self) -> Result<StepTransition, ValidationError> {
        match self.step {
            Step::DesignParameters => {
                let ticket = RunTicket::from_config(&self.config)?;
                self.results.clear(slot_for(ticket.plan.mode()));
                self.step = Step::Results;
                Ok(StepTransition::Run(ticket))
            }
            Step::Results => Ok(StepTransition::Stayed(Step::Results)),
            current => {
                validate_step(&self.config, current)?;
                let next = current.next().unwrap_or(Step::Results);
                self.step = next;
                Ok(StepTransition::Advanced(next))
            }
        }
    }

    /// Moves back one step; returns the step now shown.
    pub fn prev_step(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    pub fn go_to(&mut self, step: Step) {
        self.step = step;
    }

    fn accepts(&self, ticket: &RunTicket) -> bool {
        if ticket.matches(&self.config) {
            return true;
        }
        warn!(
            mode = %ticket.plan.mode(),
            "discarding result of a run started from a different configuration"
        );
        false
    }

    /// Stores a single-run response if the configuration is unchanged since
    /// the ticket was issued. Returns whether it was stored.
    pub fn apply_single(&mut self, ticket: &RunTicket, response: SimulationResponse) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        match ticket.plan.mode() {
            SimulationMode::PreConfigured => self.results.pre_configured = Some(response),
            SimulationMode::RealTime => self.results.custom = Some(response),
            SimulationMode::Batch => return false,
        }
        true
    }

    pub fn apply_batch(&mut self, ticket: &RunTicket, entries: Vec<BatchResultEntry>) -> bool {
        if ticket.plan.mode() != SimulationMode::Batch || !self.accepts(ticket) {
            return false;
        }
        self.results.batch = Some(entries);
        true
    }
}

fn slot_for(mode: SimulationMode) -> Derived {
    match mode {
        SimulationMode::PreConfigured => Derived::PreConfiguredResult,
        SimulationMode::RealTime => Derived::CustomResult,
        SimulationMode::Batch => Derived::BatchResults,
    }
}
