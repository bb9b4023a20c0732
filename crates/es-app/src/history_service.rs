//! Saved-simulation history, kept either in the hosted row store or in a
//! local directory.

use es_client::RowStoreClient;
use es_core::{BatchAllocation, CustomParameters, SimulationMode};
use es_results::{BatchResultEntry, HistoryStore, NewSimulationRecord, SimulationRecord};
use es_wizard::RunPlan;
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::run_service::{RunOutcome, RunOutput};
use crate::session::SessionContext;

/// Owner recorded by the local store when nobody is signed in.
pub const LOCAL_USER_ID: &str = "local";

/// Floor area recorded for a preset run whose answer carries none.
const DEFAULT_FLOOR_AREA_M2: f64 = 125.0;

#[derive(Debug, Clone)]
pub enum HistoryBackend {
    Local(HistoryStore),
    Hosted(RowStoreClient),
}

impl HistoryBackend {
    /// Hosted history when a backend is configured, the local directory
    /// otherwise.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        match &config.backend {
            Some(hosted) => Ok(Self::Hosted(RowStoreClient::new(
                &hosted.url,
                &hosted.anon_key,
                config.request_timeout(),
            )?)),
            None => Ok(Self::Local(HistoryStore::new(config.history_dir())?)),
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, Self::Hosted(_))
    }

    fn local_owner(session: &SessionContext) -> &str {
        session.user().map_or(LOCAL_USER_ID, |user| user.id.as_str())
    }

    pub async fn save(
        &self,
        session: &SessionContext,
        record: NewSimulationRecord,
    ) -> AppResult<SimulationRecord> {
        let saved = match self {
            Self::Local(store) => store.insert(Self::local_owner(session), record)?,
            Self::Hosted(rows) => {
                let active = session.require()?;
                rows.insert_simulation(&active.access_token, &active.user.id, &record)
                    .await?
            }
        };
        info!(id = %saved.id, kind = %saved.simulation_type, "saved simulation");
        Ok(saved)
    }

    /// The caller's records, newest first.
    pub async fn list(&self, session: &SessionContext) -> AppResult<Vec<SimulationRecord>> {
        match self {
            Self::Local(store) => Ok(store.list(Self::local_owner(session))?),
            Self::Hosted(rows) => {
                let active = session.require()?;
                Ok(rows
                    .list_simulations(&active.access_token, &active.user.id)
                    .await?)
            }
        }
    }

    pub async fn get(&self, session: &SessionContext, id: &str) -> AppResult<SimulationRecord> {
        match self {
            Self::Local(store) => Ok(store.get(Self::local_owner(session), id)?),
            Self::Hosted(rows) => {
                let active = session.require()?;
                Ok(rows
                    .get_simulation(&active.access_token, &active.user.id, id)
                    .await?)
            }
        }
    }

    pub async fn delete(&self, session: &SessionContext, id: &str) -> AppResult<()> {
        match self {
            Self::Local(store) => store.delete(Self::local_owner(session), id)?,
            Self::Hosted(rows) => {
                let active = session.require()?;
                rows.delete_simulation(&active.access_token, &active.user.id, id)
                    .await?;
            }
        }
        info!(id, "deleted simulation");
        Ok(())
    }
}

/// History payload for a finished run, or `None` when the run produced
/// nothing worth keeping (a preset answer with zero total energy).
///
/// A batch record describes the jobs that succeeded, so a partial run stores
/// its surviving allocation and building count.
pub fn record_for_outcome(outcome: &RunOutcome) -> AppResult<Option<NewSimulationRecord>> {
    match (&outcome.ticket.plan, &outcome.output) {
        (
            RunPlan::PreConfigured {
                weather_station,
                building_type,
                construction_period,
            },
            RunOutput::Single(response),
        ) => {
            let annual = &response.annual;
            if annual.total <= 0.0 {
                return Ok(None);
            }
            let floor_area = if annual.floor_area > 0.0 {
                annual.floor_area
            } else {
                DEFAULT_FLOOR_AREA_M2
            };
            Ok(Some(NewSimulationRecord {
                simulation_type: SimulationMode::PreConfigured,
                building_type: Some(*building_type),
                weather_station: weather_station.clone(),
                construction_period: Some(*construction_period),
                batch_config: None,
                building_count: 1,
                total_heating: annual.heating,
                total_cooling: annual.cooling,
                total_energy: annual.total,
                eui: annual.eui,
                floor_area,
                results_json: serde_json::to_value(annual)?,
                hourly_data: response.hourly.clone(),
            }))
        }
        (
            RunPlan::RealTime {
                weather_station,
                building_type,
                parameters,
            },
            RunOutput::Single(response),
        ) => {
            let annual = &response.annual;
            Ok(Some(NewSimulationRecord {
                simulation_type: SimulationMode::RealTime,
                building_type: Some(*building_type),
                weather_station: weather_station.clone(),
                construction_period: None,
                batch_config: None,
                building_count: 1,
                total_heating: annual.heating,
                total_cooling: annual.cooling,
                total_energy: annual.total,
                eui: annual.eui,
                floor_area: custom_floor_area(annual.floor_area, parameters),
                results_json: serde_json::to_value(annual)?,
                hourly_data: response.hourly.clone(),
            }))
        }
        (
            RunPlan::Batch {
                weather_station, ..
            },
            RunOutput::Batch {
                entries, aggregate, ..
            },
        ) => {
            if entries.is_empty() {
                return Ok(None);
            }
            // Hourly series stay out of batch rows.
            let summary: Vec<BatchResultEntry> = entries
                .iter()
                .map(|entry| BatchResultEntry {
                    hourly: None,
                    ..entry.clone()
                })
                .collect();
            Ok(Some(NewSimulationRecord {
                simulation_type: SimulationMode::Batch,
                building_type: None,
                weather_station: weather_station.clone(),
                construction_period: None,
                batch_config: Some(completed_allocation(entries)),
                building_count: aggregate.building_count,
                total_heating: aggregate.heating,
                total_cooling: aggregate.cooling,
                total_energy: aggregate.total,
                eui: aggregate.weighted_eui,
                floor_area: aggregate.floor_area,
                results_json: serde_json::to_value(&summary)?,
                hourly_data: None,
            }))
        }
        _ => Ok(None),
    }
}

fn completed_allocation(entries: &[BatchResultEntry]) -> BatchAllocation {
    let mut allocation = BatchAllocation::new();
    for entry in entries {
        let count = allocation
            .entry(entry.building_type)
            .or_default()
            .entry(entry.period_id)
            .or_insert(0);
        *count = count.saturating_add(entry.count);
    }
    allocation
}

fn custom_floor_area(reported: f64, parameters: &CustomParameters) -> f64 {
    if reported > 0.0 {
        reported
    } else {
        parameters.heated_floor_area
    }
}
