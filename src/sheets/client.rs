use std::sync::Arc;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{SheetsBackend, SheetsError, TokenProvider};

pub const GOOGLE_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";

const MAX_ERROR_MESSAGE_LEN: usize = 300;

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    properties: Option<SpreadsheetProperties>,
}

#[derive(Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Google Sheets v4 REST client for a single spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    base: Url,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        api_url: &str,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, url::ParseError> {
        let base = Url::parse(api_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            http,
            base,
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        })
    }

    fn url(&self, tail: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::Decode("sheets api url cannot be a base".to_string()))?;
            segments
                .pop_if_empty()
                .push("spreadsheets")
                .push(&self.spreadsheet_id);
            for segment in tail {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, SheetsError> {
        let token = self.tokens.access_token().await?;
        let resp = request.bearer_auth(token).send().await?;

        let status = resp.status();
        tracing::debug!(status = status.as_u16(), url = %resp.url(), "sheets api response");
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(SheetsError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Pull the provider's message out of an error body, bounded in length.
fn error_message(body: &str) -> String {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope.error.status.is_empty() => envelope.error.message,
        Ok(envelope) => format!("{} ({})", envelope.error.message, envelope.error.status),
        Err(_) => body.trim().to_string(),
    };
    message.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetsBackend for SheetsClient {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.url(&["values", range])?;
        let resp = self.send(self.http.get(url)).await?;
        let body: ValueRange = resp
            .json()
            .await
            .map_err(|e| SheetsError::Decode(format!("value range: {e}")))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn write_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let url = self.url(&["values", range])?;
        let body = ValueUpdate {
            range,
            major_dimension: "ROWS",
            values,
        };
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn spreadsheet_title(&self) -> Result<String, SheetsError> {
        let url = self.url(&[])?;
        let request = self
            .http
            .get(url)
            .query(&[("fields", "spreadsheetId,properties.title")]);
        let meta: SpreadsheetMeta = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Decode(format!("spreadsheet metadata: {e}")))?;
        Ok(meta.properties.map(|p| p.title).unwrap_or_default())
    }
}
