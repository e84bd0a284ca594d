//! Spreadsheet provider access.
//!
//! [`SheetsBackend`] is the seam the datastore talks to; [`SheetsClient`] is
//! the Google Sheets v4 implementation.

pub mod auth;
pub mod client;

pub use auth::{ServiceAccount, StaticToken, TokenProvider};
pub use client::SheetsClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::retry::{Classification, Classify, ErrorKind};

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("sheets api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("sheets transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sheets authentication failed: {0}")]
    Auth(String),
    #[error("unexpected sheets response: {0}")]
    Decode(String),
}

impl Classify for SheetsError {
    fn classify(&self) -> Classification {
        match self {
            SheetsError::Api { status, message } => {
                Classification::from_status_and_message(*status, message)
            }
            SheetsError::Transport(e) => Classification::from_transport(e),
            SheetsError::Auth(_) => Classification::fatal(ErrorKind::ConnectionFailed).with_status(401),
            SheetsError::Decode(_) => Classification::retryable(ErrorKind::Unknown),
        }
    }
}

/// Rows are returned as flat string cells; trailing empty cells may be absent.
#[async_trait]
pub trait SheetsBackend: Send + Sync {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    async fn write_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Lightweight metadata call used for connectivity checks.
    async fn spreadsheet_title(&self) -> Result<String, SheetsError>;
}
