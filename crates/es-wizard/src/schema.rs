//! Wizard configuration fields and step numbering.

use es_core::{
    BatchAllocation, BatchCounts, BuildingType, ConstructionPeriod, CustomParameters,
    DEFAULT_STATION, SimulationMode,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Step {
    /// Simulation mode and building typology.
    #[default]
    Typology,
    /// Weather station and construction period(s).
    BuildingInfo,
    /// Locked or editable design parameters.
    DesignParameters,
    Results,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::Typology,
        Step::BuildingInfo,
        Step::DesignParameters,
        Step::Results,
    ];

    pub fn number(self) -> u8 {
        match self {
            Step::Typology => 1,
            Step::BuildingInfo => 2,
            Step::DesignParameters => 3,
            Step::Results => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Step> {
        Step::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Typology => "Building Typology",
            Step::BuildingInfo => "Building Info",
            Step::DesignParameters => "Design Parameters",
            Step::Results => "Results",
        }
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        self.number().checked_sub(1).and_then(Step::from_number)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}

/// Every user-editable input of the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub mode: SimulationMode,
    pub building_type: BuildingType,
    pub weather_station: String,
    pub construction_period: ConstructionPeriod,
    pub custom: CustomParameters,
    pub batch_counts: BatchCounts,
    pub batch_periods: BatchAllocation,
}

impl Default for WizardConfig {
    fn default() -> Self {
        let building_type = BuildingType::SingleFamilyHouse;
        Self {
            mode: SimulationMode::default(),
            building_type,
            weather_station: DEFAULT_STATION.to_string(),
            construction_period: ConstructionPeriod::default(),
            custom: CustomParameters::defaults_for(building_type),
            batch_counts: BatchCounts::new(),
            batch_periods: BatchAllocation::new(),
        }
    }
}
