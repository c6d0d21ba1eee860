//! Request and response bodies as they travel over the wire.
//!
//! Form buffers never reach the HTTP layer directly; the orchestrators turn
//! validated form input into these snake_case bodies.

use crate::models::{ActionType, AttendanceStatus, attendance::status_after};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceCreate {
    pub date: NaiveDate,
}

/// Partial update of an attendance record for one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendancePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_up_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
}

impl AttendancePatch {
    pub fn stage(action: ActionType, at: DateTime<Utc>) -> Self {
        let mut patch = AttendancePatch {
            status: Some(status_after(action)),
            ..Default::default()
        };
        match action {
            ActionType::WakeUp => patch.wake_up_time = Some(at),
            ActionType::Departure => patch.departure_time = Some(at),
            ActionType::Arrival => patch.arrival_time = Some(at),
            ActionType::PreviousDay | ActionType::Report => patch.status = None,
        }
        patch
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousDayReportCreate {
    pub report_date: NaiveDate,
    pub next_wake_up_time: String,
    pub next_departure_time: String,
    pub next_arrival_time: String,
    pub appearance_photo_url: String,
    pub route_photo_url: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreviousDayReportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_wake_up_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_departure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_arrival_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PreviousDayReportUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityCreate {
    pub date: NaiveDate,
    pub worksite_id: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReportCreate {
    pub date: NaiveDate,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    Appearance,
    Route,
}

impl PhotoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::Appearance => "appearance",
            PhotoKind::Route => "route",
        }
    }
}

/// A photo picked by the user, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoAttachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedPhoto {
    pub url: String,
}

/// Decodes a response body that arrives either bare or wrapped in
/// `{"data": ...}`. An empty body decodes as JSON `null`.
pub(crate) fn decode_payload<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    let value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(bytes)?
    };
    let value = match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value)
}
