use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::vendor::VendorId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensitivityRunId(pub String);

impl fmt::Display for SensitivityRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityEventType {
    RequestReceived,
    SweepCompleted,
    ErrorOccurred,
}

impl SensitivityEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestReceived => "request_received",
            Self::SweepCompleted => "sweep_completed",
            Self::ErrorOccurred => "error_occurred",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "request_received" => Some(Self::RequestReceived),
            "sweep_completed" => Some(Self::SweepCompleted),
            "error_occurred" => Some(Self::ErrorOccurred),
            _ => None,
        }
    }
}

pub const COUNTER_SENSITIVITY_REQUESTS_TOTAL: &str = "sensitivity_requests_total";
pub const COUNTER_SENSITIVITY_SUCCESS_TOTAL: &str = "sensitivity_success_total";
pub const COUNTER_SENSITIVITY_FAILURES_TOTAL: &str = "sensitivity_failures_total";
pub const COUNTER_SENSITIVITY_EVALUATIONS_TOTAL: &str = "sensitivity_evaluations_total";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityOutcome {
    Accepted,
    Success,
    Rejected,
    Cancelled,
}

impl SensitivityOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accepted" => Some(Self::Accepted),
            "success" => Some(Self::Success),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityTelemetryEvent {
    pub event_type: SensitivityEventType,
    pub vendor_id: VendorId,
    pub correlation_id: String,
    pub run_id: Option<SensitivityRunId>,
    pub parameter_count: u32,
    pub evaluation_count: u32,
    pub latency_ms: i64,
    pub outcome: SensitivityOutcome,
    pub error_code: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl SensitivityTelemetryEvent {
    pub fn counter_deltas(&self) -> Vec<(&'static str, u64)> {
        match self.event_type {
            SensitivityEventType::RequestReceived => {
                vec![(COUNTER_SENSITIVITY_REQUESTS_TOTAL, 1)]
            }
            SensitivityEventType::SweepCompleted => vec![
                (COUNTER_SENSITIVITY_SUCCESS_TOTAL, 1),
                (COUNTER_SENSITIVITY_EVALUATIONS_TOTAL, u64::from(self.evaluation_count)),
            ],
            SensitivityEventType::ErrorOccurred => {
                vec![(COUNTER_SENSITIVITY_FAILURES_TOTAL, 1)]
            }
        }
    }
}
