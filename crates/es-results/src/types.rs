//! Result data types.

use chrono::{DateTime, Utc};
use es_core::{BatchAllocation, BuildingType, ConstructionPeriod, SimulationMode};
use serde::{Deserialize, Deserializer, Serialize};

pub type RecordId = String;

/// Annual outputs of one archetype in kWh/year (EUI in kWh/m²/year, peaks in kW).
///
/// `total` is the service's headline figure and does not include `fans`.
/// Missing or null fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnualResult {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub heating: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub cooling: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub dhw: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub lighting: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub equipment: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub fans: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub floor_area: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub eui: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub peak_heating_kw: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub peak_cooling_kw: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub peak_power_kw: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub avg_power_kw: f64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Hourly power for one non-leap year; index 0 is the first hour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlyPowerData {
    #[serde(default)]
    pub heating_power_kw: Vec<f64>,
    #[serde(default)]
    pub cooling_power_kw: Vec<f64>,
    #[serde(default)]
    pub total_power_kw: Vec<f64>,
}

impl HourlyPowerData {
    /// Heating and cooling series are both present.
    pub fn has_heating_and_cooling(&self) -> bool {
        !self.heating_power_kw.is_empty() && !self.cooling_power_kw.is_empty()
    }
}

/// Body returned by `/simulate` and `/simulate/custom`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "WireResponse")]
pub struct SimulationResponse {
    pub annual: AnnualResult,
    pub hourly: Option<HourlyPowerData>,
    pub cached: bool,
}

// Older service builds answered with the bare annual object.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Wrapped {
        annual: AnnualResult,
        #[serde(default)]
        hourly: Option<HourlyPowerData>,
        #[serde(default)]
        cached: bool,
    },
    Bare(AnnualResult),
}

impl From<WireResponse> for SimulationResponse {
    fn from(wire: WireResponse) -> Self {
        match wire {
            WireResponse::Wrapped {
                annual,
                hourly,
                cached,
            } => Self {
                annual,
                hourly,
                cached,
            },
            WireResponse::Bare(annual) => Self {
                annual,
                hourly: None,
                cached: false,
            },
        }
    }
}

/// One simulated archetype of a batch joined with its outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultEntry {
    pub building_type: BuildingType,
    pub period_id: ConstructionPeriod,
    pub count: u32,
    pub annual: AnnualResult,
    #[serde(default)]
    pub hourly: Option<HourlyPowerData>,
}

/// Health check answer from `GET /`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub energyplus: bool,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "running" && self.energyplus
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub station: String,
    pub period: String,
    #[serde(rename = "type")]
    pub building_type: String,
}

/// Answer from `GET /cache/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    #[serde(default)]
    pub total_cached: u64,
    #[serde(default)]
    pub entries: Vec<CacheEntry>,
}

/// Insert payload for a completed run; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSimulationRecord {
    pub simulation_type: SimulationMode,
    pub building_type: Option<BuildingType>,
    pub weather_station: String,
    pub construction_period: Option<ConstructionPeriod>,
    pub batch_config: Option<BatchAllocation>,
    pub building_count: u32,
    pub total_heating: f64,
    pub total_cooling: f64,
    pub total_energy: f64,
    pub eui: f64,
    pub floor_area: f64,
    pub results_json: serde_json::Value,
    pub hourly_data: Option<HourlyPowerData>,
}

/// Persisted snapshot of one completed run, owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: RecordId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub simulation_type: SimulationMode,
    #[serde(default)]
    pub building_type: Option<BuildingType>,
    pub weather_station: String,
    #[serde(default)]
    pub construction_period: Option<ConstructionPeriod>,
    #[serde(default)]
    pub batch_config: Option<BatchAllocation>,
    #[serde(default = "one")]
    pub building_count: u32,
    pub total_heating: f64,
    pub total_cooling: f64,
    pub total_energy: f64,
    pub eui: f64,
    pub floor_area: f64,
    #[serde(default)]
    pub results_json: serde_json::Value,
    #[serde(default)]
    pub hourly_data: Option<HourlyPowerData>,
}

fn one() -> u32 {
    1
}

impl SimulationRecord {
    pub fn from_new(
        id: RecordId,
        user_id: String,
        created_at: DateTime<Utc>,
        new: NewSimulationRecord,
    ) -> Self {
        Self {
            id,
            user_id,
            created_at,
            simulation_type: new.simulation_type,
            building_type: new.building_type,
            weather_station: new.weather_station,
            construction_period: new.construction_period,
            batch_config: new.batch_config,
            building_count: new.building_count,
            total_heating: new.total_heating,
            total_cooling: new.total_cooling,
            total_energy: new.total_energy,
            eui: new.eui,
            floor_area: new.floor_area,
            results_json: new.results_json,
            hourly_data: new.hourly_data,
        }
    }

    /// Short label for listings: the typology, or the batch composition.
    pub fn building_summary(&self) -> String {
        match (&self.batch_config, self.building_type) {
            (Some(allocation), _) if self.simulation_type == SimulationMode::Batch => {
                es_core::summarize_allocation(allocation)
            }
            (_, Some(bt)) => bt.label().to_string(),
            _ => "Various".to_string(),
        }
    }
}
