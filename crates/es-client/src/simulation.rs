//! Client for the EnergyPlus simulation service.

use std::future::Future;
use std::time::Duration;

use es_core::{BuildingType, ConstructionPeriod, CustomParameters};
use es_results::{CacheStats, HealthStatus, SimulationResponse};
use serde::Serialize;
use tracing::debug;

use crate::error::{ClientError, ClientResult, ErrorBody};
use crate::{build_http, trim_base};

/// Body of `POST /simulate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetRequest {
    pub weather_station: String,
    pub construction_period: ConstructionPeriod,
    pub building_type: BuildingType,
}

/// Body of `POST /simulate/custom`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequest {
    pub weather_station: String,
    #[serde(flatten)]
    pub parameters: CustomParameters,
    pub building_type: BuildingType,
}

/// Operations the run service needs from a simulation service.
pub trait SimulationBackend: Send + Sync {
    fn simulate(
        &self,
        request: &PresetRequest,
    ) -> impl Future<Output = ClientResult<SimulationResponse>> + Send;

    fn simulate_custom(
        &self,
        request: &CustomRequest,
    ) -> impl Future<Output = ClientResult<SimulationResponse>> + Send;

    fn health(&self) -> impl Future<Output = ClientResult<HealthStatus>> + Send;

    fn cache_stats(&self) -> impl Future<Output = ClientResult<CacheStats>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpSimulationClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSimulationClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ClientResult<Self> {
        Ok(Self {
            http: build_http(timeout)?,
            base_url: trim_base(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_simulation<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        on_error: impl FnOnce(reqwest::StatusCode, &str) -> String,
    ) -> ClientResult<SimulationResponse> {
        let url = self.url(path);
        debug!(%url, "submitting simulation");
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "simulation rejected");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: on_error(status, &text),
            });
        }
        let parsed: SimulationResponse = serde_json::from_str(&text)?;
        debug!(%url, cached = parsed.cached, "simulation finished");
        Ok(parsed)
    }
}

impl SimulationBackend for HttpSimulationClient {
    async fn simulate(&self, request: &PresetRequest) -> ClientResult<SimulationResponse> {
        self.post_simulation("/simulate", request, |_, body| {
            ErrorBody::parse(body)
                .detail()
                .unwrap_or_else(|| "Simulation failed".to_string())
        })
        .await
    }

    async fn simulate_custom(&self, request: &CustomRequest) -> ClientResult<SimulationResponse> {
        self.post_simulation("/simulate/custom", request, |status, _| {
            format!(
                "Simulation failed: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )
        })
        .await
    }

    async fn health(&self) -> ClientResult<HealthStatus> {
        let response = self.http.get(self.url("/")).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "health check failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: ErrorBody::parse(&text)
                    .detail()
                    .unwrap_or_else(|| format!("Simulation service unavailable: {status}")),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn cache_stats(&self) -> ClientResult<CacheStats> {
        let response = self.http.get(self.url("/cache/stats")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("Cache stats unavailable: {status}"),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_body_shape() {
        let body = serde_json::to_value(PresetRequest {
            weather_station: "lund".to_string(),
            construction_period: ConstructionPeriod::From1986To1995,
            building_type: BuildingType::SingleFamilyHouse,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "weatherStation": "lund",
                "constructionPeriod": "1986-1995",
                "buildingType": "single-family-house"
            })
        );
    }

    #[test]
    fn custom_body_is_flat() {
        let body = serde_json::to_value(CustomRequest {
            weather_station: "kiruna".to_string(),
            parameters: CustomParameters::defaults_for(BuildingType::MidRiseApartment),
            building_type: BuildingType::MidRiseApartment,
        })
        .unwrap();
        assert_eq!(body["weatherStation"], "kiruna");
        assert_eq!(body["wallU"], 0.3);
        assert_eq!(body["windowType"], "double");
        assert_eq!(body["ventilationType"], "mechanical-exhaust-hr");
        assert_eq!(body["heatedFloorArea"], 3135.0);
        assert_eq!(body["numberOfFloors"], 4);
        assert_eq!(body["wwr"], 20);
        assert_eq!(body["buildingType"], "mid-rise-apartment");
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = HttpSimulationClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/simulate"), "http://localhost:8000/simulate");
    }
}
