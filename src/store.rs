//! Guest list datastore on top of the spreadsheet.
//!
//! Every provider call goes through the retry wrapper; lookups are memoized
//! in a TTL cache (found codes for minutes, unknown codes for seconds) and a
//! successful submission invalidates its code's entry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::cache::TtlCache;
use crate::codec;
use crate::models::{CheckResult, GuestEntry, RsvpFormData, Submission};
use crate::retry::{ErrorKind, RetryError, RetryPolicy, retry};
use crate::sheets::{SheetsBackend, SheetsError};
use crate::validation::{self, FieldError};

pub const DEFAULT_SHEET_NAME: &str = "Guest_List";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    RateLimited,
    Auth,
    ServerError,
    Network,
    Unknown,
}

impl ProviderKind {
    fn from_retry<E>(err: &RetryError<E>) -> Self {
        match (err.kind, err.status) {
            (_, Some(401 | 403)) if !err.retryable => ProviderKind::Auth,
            (ErrorKind::RateLimited, _) => ProviderKind::RateLimited,
            (ErrorKind::ServerError, _) => ProviderKind::ServerError,
            (ErrorKind::Timeout | ErrorKind::ConnectionFailed, _) if err.retryable => {
                ProviderKind::Network
            }
            _ => ProviderKind::Unknown,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid invitation code: {0}")]
    InvalidCode(String),
    #[error("validation failed: {}", validation::format_errors(.0))]
    Validation(Vec<FieldError>),
    #[error("invitation code not found")]
    NotFound,
    #[error("submitted guest names do not match the invitation")]
    GuestMismatch,
    #[error("{operation} failed: {source}")]
    Provider {
        operation: &'static str,
        kind: ProviderKind,
        source: RetryError<SheetsError>,
    },
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub sheet_name: String,
    pub retry: RetryPolicy,
    pub positive_ttl: Duration,
    pub negative_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            retry: RetryPolicy {
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(5),
                ..RetryPolicy::default()
            },
            positive_ttl: Duration::from_secs(300),
            negative_ttl: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

pub struct GuestStore {
    backend: Arc<dyn SheetsBackend>,
    options: StoreOptions,
    cache: TtlCache<Option<GuestEntry>>,
}

fn cache_key(code: &str) -> String {
    format!("guest:{code}")
}

/// Keep the first two characters of a code for log context.
pub fn mask_code(code: &str) -> String {
    code.chars()
        .enumerate()
        .map(|(i, c)| if i < 2 { c } else { '*' })
        .collect()
}

/// Find the data row (header skipped) whose first cell matches `code`,
/// returning its 1-based sheet row number.
fn find_row<'a>(rows: &'a [Vec<String>], code: &str) -> Option<(usize, &'a [String])> {
    rows.iter().enumerate().skip(1).find_map(|(i, row)| {
        let cell = row.first()?;
        cell.trim()
            .eq_ignore_ascii_case(code)
            .then_some((i + 1, row.as_slice()))
    })
}

impl GuestStore {
    pub fn new(backend: Arc<dyn SheetsBackend>, options: StoreOptions) -> Self {
        let cache = TtlCache::with_sweep(options.sweep_interval);
        Self {
            backend,
            options,
            cache,
        }
    }

    fn full_range(&self) -> String {
        format!("{}!A:G", self.options.sheet_name)
    }

    fn row_range(&self, row: usize) -> String {
        format!("{0}!A{1}:G{1}", self.options.sheet_name, row)
    }

    fn provider_error(
        operation: &'static str,
        code: Option<&str>,
        source: RetryError<SheetsError>,
    ) -> StoreError {
        let kind = ProviderKind::from_retry(&source);
        tracing::error!(
            operation,
            code = %code.map(mask_code).unwrap_or_default(),
            kind = ?kind,
            attempts = source.attempts,
            error = %source,
            "spreadsheet operation failed"
        );
        StoreError::Provider {
            operation,
            kind,
            source,
        }
    }

    async fn read_rows(
        &self,
        operation: &'static str,
        code: Option<&str>,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let range = self.full_range();
        retry(&self.options.retry, operation, || self.backend.read_range(&range))
            .await
            .map_err(|e| Self::provider_error(operation, code, e))
    }

    /// Look up a party by invitation code.
    ///
    /// Bad formats fail before any provider call. Both hits and misses are
    /// cached, misses for the shorter negative TTL.
    pub async fn lookup(&self, raw_code: &str) -> Result<Option<GuestEntry>, StoreError> {
        let code = validation::normalize_code(raw_code).map_err(StoreError::InvalidCode)?;
        let key = cache_key(&code);

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let rows = self.read_rows("lookup", Some(&code)).await?;
        let entry = find_row(&rows, &code).map(|(_, row)| codec::decode_row(row));

        let ttl = if entry.is_some() {
            self.options.positive_ttl
        } else {
            self.options.negative_ttl
        };
        self.cache.set(key, entry.clone(), ttl);
        Ok(entry)
    }

    /// Record an RSVP, overwriting the party's row.
    ///
    /// Concurrent submissions for one code race; the last write wins.
    pub async fn submit(&self, form: &RsvpFormData) -> Result<Submission, StoreError> {
        let form = validation::validate_rsvp(form).map_err(StoreError::Validation)?;
        let code = form.invitation_code.as_str();

        let rows = self.read_rows("submit", Some(code)).await?;
        let Some((row_number, row)) = find_row(&rows, code) else {
            return Err(StoreError::NotFound);
        };
        let stored = codec::decode_row(row);

        if !codec::guests_match(&stored, &form) {
            tracing::info!(code = %mask_code(code), "rejected rsvp with mismatched guest names");
            return Err(StoreError::GuestMismatch);
        }

        let is_update = stored.is_submitted();
        let submitted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let updated = codec::apply_submission(&stored, &form, &submitted_at);
        let values = vec![codec::encode_row(&updated)];
        let range = self.row_range(row_number);

        retry(&self.options.retry, "submit", || {
            self.backend.write_range(&range, values.clone())
        })
        .await
        .map_err(|e| Self::provider_error("submit", Some(code), e))?;

        self.cache.delete(&cache_key(code));
        tracing::info!(
            code = %mask_code(code),
            status = %updated.rsvp_status,
            attending = updated.attending_count(),
            is_update,
            "rsvp recorded"
        );

        Ok(Submission {
            invitation_code: updated.invitation_code,
            submission_date: submitted_at,
            is_update,
        })
    }

    /// Whether the party already answered. Unknown codes report `false`.
    pub async fn is_already_submitted(&self, raw_code: &str) -> Result<bool, StoreError> {
        Ok(self
            .lookup(raw_code)
            .await?
            .is_some_and(|entry| entry.is_submitted()))
    }

    /// Every party with an invitation code, in sheet order.
    pub async fn all_entries(&self) -> Result<Vec<GuestEntry>, StoreError> {
        let rows = self.read_rows("list", None).await?;
        Ok(rows
            .iter()
            .skip(1)
            .filter(|row| row.first().is_some_and(|c| !c.trim().is_empty()))
            .map(|row| codec::decode_row(row))
            .collect())
    }

    /// Check that the spreadsheet is reachable. Never mutates anything.
    pub async fn health_check(&self) -> CheckResult {
        match retry(&self.options.retry, "health_check", || {
            self.backend.spreadsheet_title()
        })
        .await
        {
            Ok(title) => {
                tracing::debug!(title = %title, "spreadsheet reachable");
                CheckResult::healthy("Spreadsheet connection successful")
            }
            Err(e) => {
                tracing::error!(error = %e, "spreadsheet health check failed");
                CheckResult::unhealthy("Unable to reach the spreadsheet")
            }
        }
    }
}
