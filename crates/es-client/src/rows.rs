//! Row-store client for the `simulations` and `feedback` tables (`/rest/v1`).
//!
//! Every query carries a `user_id` filter in addition to the store's own
//! row-level policies.

use std::time::Duration;

use es_results::{NewSimulationRecord, SimulationRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult, ErrorBody};
use crate::{build_http, trim_base};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub user_id: String,
    pub user_email: Option<String>,
    /// 1..=5
    pub rating: u8,
    pub message: Option<String>,
    pub page: String,
}

#[derive(Serialize)]
struct SimulationRow<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    record: &'a NewSimulationRecord,
}

#[derive(Debug, Clone)]
pub struct RowStoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RowStoreClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Option<Duration>) -> ClientResult<Self> {
        Ok(Self {
            http: build_http(timeout)?,
            base_url: trim_base(base_url),
            api_key: api_key.to_string(),
        })
    }

    fn table(
        &self,
        method: reqwest::Method,
        table: &str,
        access_token: &str,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
    }

    async fn send(&self, builder: reqwest::RequestBuilder, what: &str) -> ClientResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status == reqwest::StatusCode::NOT_ACCEPTABLE {
            // A single-object request matched no row.
            return Err(ClientError::NotFound {
                what: what.to_string(),
            });
        }
        if !status.is_success() {
            let message = ErrorBody::parse(&text)
                .message()
                .unwrap_or_else(|| format!("Failed to {what}"));
            debug!(status = status.as_u16(), %message, "row store request rejected");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(text)
    }

    pub async fn insert_simulation(
        &self,
        access_token: &str,
        user_id: &str,
        record: &NewSimulationRecord,
    ) -> ClientResult<SimulationRecord> {
        let builder = self
            .table(reqwest::Method::POST, "simulations", access_token)
            .header("Prefer", "return=representation")
            .json(&SimulationRow { user_id, record });
        let text = self.send(builder, "save simulation").await?;
        let mut rows: Vec<SimulationRecord> = serde_json::from_str(&text)?;
        rows.pop().ok_or_else(|| ClientError::NotFound {
            what: "inserted simulation".to_string(),
        })
    }

    /// Simulations of `user_id`, newest first.
    pub async fn list_simulations(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> ClientResult<Vec<SimulationRecord>> {
        let user_filter = format!("eq.{user_id}");
        let builder = self
            .table(reqwest::Method::GET, "simulations", access_token)
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.desc"),
            ]);
        let text = self.send(builder, "fetch simulations").await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn get_simulation(
        &self,
        access_token: &str,
        user_id: &str,
        id: &str,
    ) -> ClientResult<SimulationRecord> {
        let id_filter = format!("eq.{id}");
        let user_filter = format!("eq.{user_id}");
        let builder = self
            .table(reqwest::Method::GET, "simulations", access_token)
            .header("Accept", "application/vnd.pgrst.object+json")
            .query(&[
                ("select", "*"),
                ("id", id_filter.as_str()),
                ("user_id", user_filter.as_str()),
            ]);
        let text = self.send(builder, &format!("simulation {id}")).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn delete_simulation(
        &self,
        access_token: &str,
        user_id: &str,
        id: &str,
    ) -> ClientResult<()> {
        let id_filter = format!("eq.{id}");
        let user_filter = format!("eq.{user_id}");
        let builder = self
            .table(reqwest::Method::DELETE, "simulations", access_token)
            .query(&[("id", id_filter.as_str()), ("user_id", user_filter.as_str())]);
        self.send(builder, "delete simulation").await?;
        Ok(())
    }

    pub async fn insert_feedback(
        &self,
        access_token: &str,
        entry: &FeedbackEntry,
    ) -> ClientResult<()> {
        let builder = self
            .table(reqwest::Method::POST, "feedback", access_token)
            .json(entry);
        self.send(builder, "submit feedback").await?;
        Ok(())
    }
}
