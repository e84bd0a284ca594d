//! Environment configuration.
//!
//! Read once at startup (after `dotenvy` has loaded any `.env` file). Parsing
//! goes through a lookup closure so it can be exercised without touching the
//! process environment.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::models::EventInfo;
use crate::retry::RetryPolicy;
use crate::sheets::auth::GOOGLE_TOKEN_URL;
use crate::sheets::client::GOOGLE_SHEETS_API_URL;
use crate::store::{DEFAULT_SHEET_NAME, StoreOptions};
use crate::validation::is_valid_email;

pub const PRIVATE_KEY: &str = "GOOGLE_SHEETS_PRIVATE_KEY";
pub const CLIENT_EMAIL: &str = "GOOGLE_SHEETS_CLIENT_EMAIL";
pub const SPREADSHEET_ID: &str = "GOOGLE_SHEETS_SPREADSHEET_ID";
pub const WEDDING_DATE: &str = "WEDDING_DATE";
pub const VENUE_NAME: &str = "VENUE_NAME";

const REQUIRED: [&str; 5] = [PRIVATE_KEY, CLIENT_EMAIL, SPREADSHEET_ID, WEDDING_DATE, VENUE_NAME];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct SheetsConfig {
    pub private_key: String,
    pub client_email: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub api_url: String,
    pub token_url: String,
}

impl fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_name", &self.sheet_name)
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub sheets: SheetsConfig,
    pub event: EventInfo,
    pub store: StoreOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&'static str> = REQUIRED
            .iter()
            .copied()
            .filter(|&key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |key: &'static str| get(key).unwrap_or_default();

        let bind_addr = parse_or(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let defaults = StoreOptions::default();
        let retry = RetryPolicy {
            max_retries: parse_or(&get, "SHEETS_MAX_RETRIES", defaults.retry.max_retries)?,
            base_delay: millis_or(&get, "SHEETS_BASE_DELAY_MS", defaults.retry.base_delay)?,
            max_delay: millis_or(&get, "SHEETS_MAX_DELAY_MS", defaults.retry.max_delay)?,
            attempt_timeout: millis_or(&get, "SHEETS_TIMEOUT_MS", defaults.retry.attempt_timeout)?,
            ..defaults.retry
        };
        let sheet_name = get("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());

        let store = StoreOptions {
            sheet_name: sheet_name.clone(),
            retry,
            positive_ttl: secs_or(&get, "CACHE_TTL_SECS", defaults.positive_ttl)?,
            negative_ttl: secs_or(&get, "CACHE_NEGATIVE_TTL_SECS", defaults.negative_ttl)?,
            sweep_interval: secs_or(&get, "CACHE_SWEEP_SECS", defaults.sweep_interval)?,
        };
        if store.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "CACHE_SWEEP_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            sheets: SheetsConfig {
                // keys pasted into .env files usually carry escaped newlines
                private_key: required(PRIVATE_KEY).replace("\\n", "\n"),
                client_email: required(CLIENT_EMAIL),
                spreadsheet_id: required(SPREADSHEET_ID),
                sheet_name,
                api_url: get("SHEETS_API_URL").unwrap_or_else(|| GOOGLE_SHEETS_API_URL.to_string()),
                token_url: get("SHEETS_TOKEN_URL").unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
            },
            event: EventInfo {
                couple_names: get("COUPLE_NAMES"),
                date: required(WEDDING_DATE),
                venue: required(VENUE_NAME),
                address: get("VENUE_ADDRESS"),
            },
            store,
        })
    }

    /// Format problems that do not stop startup but should show up in health checks.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let values = [
            (PRIVATE_KEY, self.sheets.private_key.as_str()),
            (CLIENT_EMAIL, self.sheets.client_email.as_str()),
            (SPREADSHEET_ID, self.sheets.spreadsheet_id.as_str()),
            (WEDDING_DATE, self.event.date.as_str()),
            (VENUE_NAME, self.event.venue.as_str()),
        ];
        for (var, value) in values {
            if value.contains("your_") || value.contains("...") {
                warnings.push(format!("{var} contains a placeholder value"));
            }
        }

        let key = &self.sheets.private_key;
        if !key.contains("BEGIN PRIVATE KEY") || !key.contains("END PRIVATE KEY") {
            warnings.push(format!("{PRIVATE_KEY} is missing BEGIN/END markers"));
        }
        if !is_valid_email(&self.sheets.client_email) {
            warnings.push(format!("{CLIENT_EMAIL} is not a valid email address"));
        }
        if self.sheets.spreadsheet_id.len() <= 20 {
            warnings.push(format!("{SPREADSHEET_ID} looks too short"));
        }

        warnings
    }
}

fn parse_or<G, T>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

fn millis_or<G>(get: &G, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let default = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_or(get, var, default).map(Duration::from_millis)
}

fn secs_or<G>(get: &G, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    parse_or(get, var, default.as_secs()).map(Duration::from_secs)
}
