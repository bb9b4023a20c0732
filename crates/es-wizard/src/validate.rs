//! Step gating rules.

use es_core::{
    BatchAllocation, BuildingType, CoreError, MAX_BATCH_COUNT_PER_TYPE, MIN_BATCH_BUILDINGS,
    SimulationMode, allocated_for, counts_from_allocation, find_station, total_buildings,
};

use crate::schema::{Step, WizardConfig};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Building type is not available for simulation: {building_type}")]
    BuildingTypeUnavailable { building_type: BuildingType },

    #[error("A batch needs at least {min} buildings, got {total}")]
    BatchTooSmall { total: u32, min: u32 },

    #[error("Batch count for {building_type} must be at most {max}, got {count}")]
    BatchCountOutOfRange {
        building_type: BuildingType,
        count: u32,
        max: u32,
    },

    #[error("No weather station selected")]
    MissingWeatherStation,

    #[error("Unknown weather station: {station}")]
    UnknownWeatherStation { station: String },

    #[error("Construction periods for {building_type} cover {allocated} of {expected} buildings")]
    AllocationMismatch {
        building_type: BuildingType,
        expected: u32,
        allocated: u32,
    },

    #[error("Invalid design parameter: {0}")]
    Parameter(#[from] CoreError),

    #[error("Run plan could not be encoded: {message}")]
    PlanEncoding { message: String },
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::PlanEncoding {
            message: err.to_string(),
        }
    }
}

/// Checks whether `step` may be left in the forward direction.
pub fn validate_step(config: &WizardConfig, step: Step) -> Result<(), ValidationError> {
    match step {
        Step::Typology => validate_typology(config),
        Step::BuildingInfo => validate_building_info(config),
        Step::DesignParameters | Step::Results => Ok(()),
    }
}

fn validate_typology(config: &WizardConfig) -> Result<(), ValidationError> {
    if config.mode != SimulationMode::Batch {
        if !config.building_type.is_available() {
            return Err(ValidationError::BuildingTypeUnavailable {
                building_type: config.building_type,
            });
        }
        return Ok(());
    }

    for (&building_type, &count) in &config.batch_counts {
        if count > MAX_BATCH_COUNT_PER_TYPE {
            return Err(ValidationError::BatchCountOutOfRange {
                building_type,
                count,
                max: MAX_BATCH_COUNT_PER_TYPE,
            });
        }
        if count > 0 && !building_type.is_available() {
            return Err(ValidationError::BuildingTypeUnavailable { building_type });
        }
    }

    let total = total_buildings(&config.batch_counts);
    if total < MIN_BATCH_BUILDINGS {
        return Err(ValidationError::BatchTooSmall {
            total,
            min: MIN_BATCH_BUILDINGS,
        });
    }
    Ok(())
}

fn validate_building_info(config: &WizardConfig) -> Result<(), ValidationError> {
    let station = config.weather_station.trim();
    if station.is_empty() {
        return Err(ValidationError::MissingWeatherStation);
    }
    if find_station(station).is_none() {
        return Err(ValidationError::UnknownWeatherStation {
            station: station.to_string(),
        });
    }

    if config.mode != SimulationMode::Batch {
        return Ok(());
    }

    for building_type in BuildingType::ALL {
        let expected = config.batch_counts.get(&building_type).copied().unwrap_or(0);
        let allocated = allocated_for(&config.batch_periods, building_type);
        if allocated != expected {
            return Err(ValidationError::AllocationMismatch {
                building_type,
                expected,
                allocated,
            });
        }
    }
    Ok(())
}

/// Standalone checks for an allocation loaded from a file.
pub fn validate_allocation(allocation: &BatchAllocation) -> Result<(), ValidationError> {
    for (&building_type, periods) in allocation {
        if let Some(&count) = periods.values().find(|&&n| n > MAX_BATCH_COUNT_PER_TYPE) {
            return Err(ValidationError::BatchCountOutOfRange {
                building_type,
                count,
                max: MAX_BATCH_COUNT_PER_TYPE,
            });
        }
    }
    let counts = counts_from_allocation(allocation);
    for (&building_type, &count) in &counts {
        if !building_type.is_available() {
            return Err(ValidationError::BuildingTypeUnavailable { building_type });
        }
        if count > MAX_BATCH_COUNT_PER_TYPE {
            return Err(ValidationError::BatchCountOutOfRange {
                building_type,
                count,
                max: MAX_BATCH_COUNT_PER_TYPE,
            });
        }
    }
    let total = total_buildings(&counts);
    if total < MIN_BATCH_BUILDINGS {
        return Err(ValidationError::BatchTooSmall {
            total,
            min: MIN_BATCH_BUILDINGS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use es_core::ConstructionPeriod;

    fn batch_config() -> WizardConfig {
        let mut config = WizardConfig {
            mode: SimulationMode::Batch,
            ..WizardConfig::default()
        };
        config.batch_counts.insert(BuildingType::SingleFamilyHouse, 2);
        config.batch_counts.insert(BuildingType::MidRiseApartment, 1);
        config
    }

    #[test]
    fn single_mode_needs_available_type() {
        let mut config = WizardConfig::default();
        assert!(validate_step(&config, Step::Typology).is_ok());
        config.building_type = BuildingType::Hospital;
        assert_eq!(
            validate_step(&config, Step::Typology),
            Err(ValidationError::BuildingTypeUnavailable {
                building_type: BuildingType::Hospital
            })
        );
    }

    #[test]
    fn batch_needs_two_buildings() {
        let mut config = batch_config();
        assert!(validate_step(&config, Step::Typology).is_ok());
        config.batch_counts.clear();
        config.batch_counts.insert(BuildingType::SingleFamilyHouse, 1);
        assert_eq!(
            validate_step(&config, Step::Typology),
            Err(ValidationError::BatchTooSmall { total: 1, min: 2 })
        );
    }

    #[test]
    fn allocation_must_match_counts() {
        let mut config = batch_config();
        config
            .batch_periods
            .entry(BuildingType::SingleFamilyHouse)
            .or_default()
            .insert(ConstructionPeriod::From1986To1995, 2);
        assert_eq!(
            validate_step(&config, Step::BuildingInfo),
            Err(ValidationError::AllocationMismatch {
                building_type: BuildingType::MidRiseApartment,
                expected: 1,
                allocated: 0,
            })
        );
        config
            .batch_periods
            .entry(BuildingType::MidRiseApartment)
            .or_default()
            .insert(ConstructionPeriod::From1996To2005, 1);
        assert!(validate_step(&config, Step::BuildingInfo).is_ok());
    }

    #[test]
    fn station_must_be_known() {
        let mut config = WizardConfig::default();
        config.weather_station = "  ".to_string();
        assert_eq!(
            validate_step(&config, Step::BuildingInfo),
            Err(ValidationError::MissingWeatherStation)
        );
        config.weather_station = "atlantis".to_string();
        assert!(matches!(
            validate_step(&config, Step::BuildingInfo),
            Err(ValidationError::UnknownWeatherStation { .. })
        ));
    }

    #[test]
    fn design_parameters_step_has_no_gate() {
        let mut config = WizardConfig::default();
        config.custom.wall_u = 99.0;
        assert!(validate_step(&config, Step::DesignParameters).is_ok());
    }
}
