use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: HealthState,
    pub message: String,
}

impl CheckResult {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Healthy,
            message: message.into(),
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Degraded,
            message: message.into(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Unhealthy,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub sheets: CheckResult,
    pub configuration: CheckResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthState,
    pub timestamp: String,
    pub checks: HealthChecks,
}

impl HealthReport {
    /// Combine sub-checks: any unhealthy check makes the whole report
    /// unhealthy, any degraded one makes it degraded.
    pub fn from_checks(checks: HealthChecks) -> Self {
        let states = [checks.sheets.status, checks.configuration.status];
        let status = if states.contains(&HealthState::Unhealthy) {
            HealthState::Unhealthy
        } else if states.contains(&HealthState::Degraded) {
            HealthState::Degraded
        } else {
            HealthState::Healthy
        };
        Self {
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks,
        }
    }
}
