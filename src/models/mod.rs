pub mod api;
pub mod event;
pub mod guest;
pub mod health;
pub mod log;
pub mod rsvp;

pub use api::ApiResponse;
pub use event::EventInfo;
pub use guest::{GuestEntry, RsvpStatus};
pub use health::{CheckResult, HealthChecks, HealthReport, HealthState};
pub use log::{ClientLogEntry, LogLevel};
pub use rsvp::{GuestResponse, RsvpFormData, Submission};
