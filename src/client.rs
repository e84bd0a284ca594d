//! HTTP client for the RSVP API, with the same retry behaviour the server
//! applies to the spreadsheet.

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::models::{ApiResponse, ClientLogEntry, GuestEntry, HealthReport, RsvpFormData, Submission};
use crate::retry::{Classification, Classify, ErrorKind, RetryError, RetryPolicy, retry};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl Classify for ClientError {
    fn classify(&self) -> Classification {
        match self {
            ClientError::Status { status, message } => {
                Classification::from_status_and_message(*status, message)
            }
            ClientError::Transport(e) => Classification::from_transport(e),
            ClientError::Decode(_) => Classification::fatal(ErrorKind::Unknown),
        }
    }
}

pub struct RsvpClient {
    http: reqwest::Client,
    base: Url,
    policy: RetryPolicy,
}

impl RsvpClient {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_policy(base_url, RetryPolicy::default())
    }

    pub fn with_policy(base_url: &str, policy: RetryPolicy) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            policy,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::Decode(format!("bad path {path}: {e}")))
    }

    async fn expect_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let message = error_message(&resp.text().await.unwrap_or_default());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }
        resp.json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn fetch_entry(&self, code: &str) -> Result<Option<GuestEntry>, ClientError> {
        let mut url = self.url("codes/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Decode("base url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(code);
        let resp = self.http.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: ApiResponse<GuestEntry> = Self::expect_json(resp).await?;
        Ok(body.data)
    }

    async fn post_form(&self, form: &RsvpFormData) -> Result<Submission, ClientError> {
        let resp = self.http.post(self.url("rsvp")?).json(form).send().await?;
        let body: ApiResponse<Submission> = Self::expect_json(resp).await?;
        body.data
            .ok_or_else(|| ClientError::Decode("missing submission data".to_string()))
    }

    async fn fetch_health(&self) -> Result<HealthReport, ClientError> {
        let resp = self.http.get(self.url("health")?).send().await?;
        // an unhealthy server still answers with a full report
        if resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return resp
                .json()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()));
        }
        Self::expect_json(resp).await
    }

    async fn post_log(&self, entry: &ClientLogEntry) -> Result<(), ClientError> {
        let resp = self.http.post(self.url("logs")?).json(entry).send().await?;
        let _: serde_json::Value = Self::expect_json(resp).await?;
        Ok(())
    }

    /// Look up an invitation. Unknown codes are `Ok(None)`.
    pub async fn lookup(&self, code: &str) -> Result<Option<GuestEntry>, RetryError<ClientError>> {
        retry(&self.policy, "client_lookup", || self.fetch_entry(code)).await
    }

    pub async fn submit(&self, form: &RsvpFormData) -> Result<Submission, RetryError<ClientError>> {
        retry(&self.policy, "client_submit", || self.post_form(form)).await
    }

    pub async fn health(&self) -> Result<HealthReport, RetryError<ClientError>> {
        retry(&self.policy, "client_health", || self.fetch_health()).await
    }

    pub async fn send_log(&self, entry: &ClientLogEntry) -> Result<(), RetryError<ClientError>> {
        retry(&self.policy, "client_log", || self.post_log(entry)).await
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
