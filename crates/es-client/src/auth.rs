//! Email/password accounts against the hosted auth provider (`/auth/v1`).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{ClientError, ClientResult, ErrorBody};
use crate::{build_http, trim_base};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
}

impl User {
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

/// Sign-up either signs the user in or waits for the emailed code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired(User),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(Session),
    User(User),
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Option<Duration>) -> ClientResult<Self> {
        Ok(Self {
            http: build_http(timeout)?,
            base_url: trim_base(base_url),
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/auth/v1{}", self.base_url, path))
            .header("apikey", &self.api_key)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ClientResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = ErrorBody::parse(&text).message().unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            debug!(status = status.as_u16(), %message, "auth request rejected");
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message,
            });
        }
        Ok(text)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<SignUpOutcome> {
        let builder = self
            .request(reqwest::Method::POST, "/signup")
            .json(&json!({ "email": email, "password": password }));
        let text = self.send(builder).await?;
        Ok(match serde_json::from_str::<SignUpBody>(&text)? {
            SignUpBody::Session(session) => SignUpOutcome::SignedIn(session),
            SignUpBody::User(user) => SignUpOutcome::ConfirmationRequired(user),
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        let builder = self
            .request(reqwest::Method::POST, "/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let text = self.send(builder).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Confirms a sign-up with the one-time code sent by email.
    pub async fn verify_otp(&self, email: &str, token: &str) -> ClientResult<Session> {
        let builder = self
            .request(reqwest::Method::POST, "/verify")
            .json(&json!({ "type": "signup", "email": email, "token": token }));
        let text = self.send(builder).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn resend_verification(&self, email: &str) -> ClientResult<()> {
        let builder = self
            .request(reqwest::Method::POST, "/resend")
            .json(&json!({ "type": "signup", "email": email }));
        self.send(builder).await?;
        Ok(())
    }

    pub async fn current_user(&self, access_token: &str) -> ClientResult<User> {
        let builder = self
            .request(reqwest::Method::GET, "/user")
            .bearer_auth(access_token);
        let text = self.send(builder).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
        let builder = self
            .request(reqwest::Method::POST, "/logout")
            .bearer_auth(access_token);
        self.send(builder).await?;
        Ok(())
    }
}
