#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use rsvp::models::EventInfo;
use rsvp::retry::RetryPolicy;
use rsvp::sheets::{SheetsBackend, SheetsError};
use rsvp::store::{GuestStore, StoreOptions};
use rsvp::AppState;
use serde_json::Value;

pub const SHEET: &str = "Guest_List";

/// In-memory spreadsheet. Failures queued with [`FakeSheet::fail_next`] are
/// returned by the next provider calls, one per call.
pub struct FakeSheet {
    rows: Mutex<Vec<Vec<String>>>,
    failures: Mutex<VecDeque<(u16, String)>>,
    write_failures: Mutex<VecDeque<(u16, String)>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FakeSheet {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failures: Mutex::new(VecDeque::new()),
            write_failures: Mutex::new(VecDeque::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, times: usize, status: u16, message: &str) {
        let mut failures = self.failures.lock();
        for _ in 0..times {
            failures.push_back((status, message.to_string()));
        }
    }

    /// Like [`FakeSheet::fail_next`], but only for writes.
    pub fn fail_writes(&self, times: usize, status: u16, message: &str) {
        let mut failures = self.write_failures.lock();
        for _ in 0..times {
            failures.push_back((status, message.to_string()));
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn row(&self, code: &str) -> Vec<String> {
        self.rows
            .lock()
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(code))
            .cloned()
            .unwrap_or_else(|| panic!("no row for {code}"))
    }

    fn take_failure(&self) -> Result<(), SheetsError> {
        Self::pop(&self.failures)
    }

    fn pop(queue: &Mutex<VecDeque<(u16, String)>>) -> Result<(), SheetsError> {
        match queue.lock().pop_front() {
            Some((status, message)) => Err(SheetsError::Api { status, message }),
            None => Ok(()),
        }
    }
}

/// Parse the 1-based row number out of a range like `Guest_List!A3:G3`.
fn row_number(range: &str) -> usize {
    let cells = range.split('!').nth(1).expect("range has a sheet prefix");
    let start = cells.split(':').next().unwrap();
    start.trim_start_matches(char::is_alphabetic).parse().unwrap()
}

#[async_trait]
impl SheetsBackend for FakeSheet {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        assert_eq!(range, format!("{SHEET}!A:G"));
        Ok(self.rows.lock().clone())
    }

    async fn write_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Self::pop(&self.write_failures)?;
        let index = row_number(range) - 1;
        let mut rows = self.rows.lock();
        for (offset, row) in values.into_iter().enumerate() {
            let at = index + offset;
            if rows.len() <= at {
                rows.resize(at + 1, Vec::new());
            }
            rows[at] = row;
        }
        Ok(())
    }

    async fn spreadsheet_title(&self) -> Result<String, SheetsError> {
        self.take_failure()?;
        Ok("Wedding Guests".to_string())
    }
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Header plus four parties: three unanswered, one already answered.
pub fn guest_rows() -> Vec<Vec<String>> {
    vec![
        row(&[
            "Invitation Code",
            "Guest Names",
            "RSVP Status",
            "Dietary Restrictions",
            "Personal Message",
            "Submission Date",
            "Email",
        ]),
        row(&["AB12CD", "Anna, Bjorn", "pending", "", "", "", ""]),
        row(&["SOLO1", "Carl Jones", "pending"]),
        row(&["NORD88", "Anna, Bjørn", "pending", "", "", "", ""]),
        row(&[
            "DONE22",
            "Dana Lee, Eli Lee",
            "attending, not_attending",
            "Dana Lee: vegetarian",
            "See you there",
            "2026-05-01T10:00:00.000Z",
            "dana@example.com",
        ]),
    ]
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        attempt_timeout: Duration::from_secs(2),
        jitter: false,
        ..RetryPolicy::default()
    }
}

pub fn event() -> EventInfo {
    EventInfo {
        couple_names: Some("Anna & Bjorn".to_string()),
        date: "2026-06-20".to_string(),
        venue: "The Old Mill".to_string(),
        address: None,
    }
}

pub struct TestApp {
    pub router: Router,
    pub sheet: Arc<FakeSheet>,
    pub store: Arc<GuestStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_warnings(Vec::new())
    }

    pub fn with_warnings(warnings: Vec<String>) -> Self {
        let sheet = Arc::new(FakeSheet::new(guest_rows()));
        let options = StoreOptions {
            sheet_name: SHEET.to_string(),
            retry: fast_retry(),
            ..StoreOptions::default()
        };
        let store = Arc::new(GuestStore::new(sheet.clone(), options));

        let state = AppState {
            store: store.clone(),
            event: Arc::new(event()),
            config_warnings: Arc::new(warnings),
        };
        let router = rsvp::build_app(state);

        Self {
            router,
            sheet,
            store,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// POST a raw body as JSON.
    pub async fn post_raw(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.post_raw(uri, &body.to_string()).await
    }
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
