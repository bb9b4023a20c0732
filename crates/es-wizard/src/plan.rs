//! What a run will submit, derived from a validated configuration.

use es_core::{
    BatchAllocation, BuildingType, ConstructionPeriod, CustomParameters, SimulationJob,
    SimulationMode,
};
use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint_plan;
use crate::jobs::build_jobs;
use crate::schema::{Step, WizardConfig};
use crate::validate::{ValidationError, validate_step};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RunPlan {
    PreConfigured {
        weather_station: String,
        building_type: BuildingType,
        construction_period: ConstructionPeriod,
    },
    RealTime {
        weather_station: String,
        building_type: BuildingType,
        parameters: CustomParameters,
    },
    Batch {
        weather_station: String,
        allocation: BatchAllocation,
        jobs: Vec<SimulationJob>,
    },
}

impl RunPlan {
    /// Builds the plan for the configured mode after re-checking every gate,
    /// so a plan is never derived from a configuration edited past its step.
    pub fn from_config(config: &WizardConfig) -> Result<Self, ValidationError> {
        validate_step(config, Step::Typology)?;
        validate_step(config, Step::BuildingInfo)?;

        let weather_station = config.weather_station.trim().to_string();
        let plan = match config.mode {
            SimulationMode::PreConfigured => RunPlan::PreConfigured {
                weather_station,
                building_type: config.building_type,
                construction_period: config.construction_period,
            },
            SimulationMode::RealTime => {
                config.custom.validate(config.building_type)?;
                RunPlan::RealTime {
                    weather_station,
                    building_type: config.building_type,
                    parameters: config.custom,
                }
            }
            SimulationMode::Batch => RunPlan::Batch {
                weather_station,
                allocation: config.batch_periods.clone(),
                jobs: build_jobs(&config.batch_periods),
            },
        };
        Ok(plan)
    }

    pub fn mode(&self) -> SimulationMode {
        match self {
            RunPlan::PreConfigured { .. } => SimulationMode::PreConfigured,
            RunPlan::RealTime { .. } => SimulationMode::RealTime,
            RunPlan::Batch { .. } => SimulationMode::Batch,
        }
    }

    pub fn weather_station(&self) -> &str {
        match self {
            RunPlan::PreConfigured { weather_station, .. }
            | RunPlan::RealTime { weather_station, .. }
            | RunPlan::Batch { weather_station, .. } => weather_station,
        }
    }

    /// Number of remote simulations the plan issues.
    pub fn job_count(&self) -> usize {
        match self {
            RunPlan::Batch { jobs, .. } => jobs.len(),
            _ => 1,
        }
    }
}

/// A plan together with the fingerprint of the configuration it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTicket {
    pub plan: RunPlan,
    pub fingerprint: String,
}

impl RunTicket {
    pub fn new(plan: RunPlan) -> Result<Self, ValidationError> {
        let fingerprint = fingerprint_plan(&plan)?;
        Ok(Self { plan, fingerprint })
    }

    pub fn from_config(config: &WizardConfig) -> Result<Self, ValidationError> {
        Self::new(RunPlan::from_config(config)?)
    }

    /// Whether `config` still produces exactly this plan.
    pub fn matches(&self, config: &WizardConfig) -> bool {
        RunPlan::from_config(config)
            .ok()
            .and_then(|plan| fingerprint_plan(&plan).ok())
            .is_some_and(|fingerprint| fingerprint == self.fingerprint)
    }
}
