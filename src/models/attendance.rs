use crate::models::status::{ActionType, AttendanceStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One staff member's attendance for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub wake_up_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub wake_up_location: Option<String>,
    #[serde(default)]
    pub wake_up_notes: Option<String>,
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub departure_location: Option<String>,
    #[serde(default)]
    pub departure_notes: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arrival_location: Option<String>,
    #[serde(default)]
    pub arrival_gps_location: Option<String>,
    #[serde(default)]
    pub arrival_notes: Option<String>,
    #[serde(default)]
    pub route_photo_url: Option<String>,
    #[serde(default)]
    pub appearance_photo_url: Option<String>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Timestamp recorded for a stage. Stages without a timestamp on the
    /// record (previous-day, report) always return `None`.
    pub fn stage_time(&self, action: ActionType) -> Option<DateTime<Utc>> {
        match action {
            ActionType::WakeUp => self.wake_up_time,
            ActionType::Departure => self.departure_time,
            ActionType::Arrival => self.arrival_time,
            ActionType::PreviousDay | ActionType::Report => None,
        }
    }

    /// Stamp a stage and advance the status. An already stamped stage keeps
    /// its original time.
    pub fn record_stage(&mut self, action: ActionType, at: DateTime<Utc>) {
        let slot = match action {
            ActionType::WakeUp => &mut self.wake_up_time,
            ActionType::Departure => &mut self.departure_time,
            ActionType::Arrival => &mut self.arrival_time,
            ActionType::PreviousDay | ActionType::Report => return,
        };
        if slot.is_none() {
            *slot = Some(at);
        }
        self.status = status_after(action);
    }
}

/// Status a record moves to once the given stage has been reported.
pub fn status_after(action: ActionType) -> AttendanceStatus {
    match action {
        ActionType::Arrival => AttendanceStatus::Complete,
        _ => AttendanceStatus::Partial,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn pending_record() -> AttendanceRecord {
        let created = Utc.with_ymd_and_hms(2025, 12, 18, 20, 0, 0).unwrap();
        AttendanceRecord {
            id: "rec-1".to_string(),
            staff_id: "staff-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 19).unwrap(),
            wake_up_time: None,
            wake_up_location: None,
            wake_up_notes: None,
            departure_time: None,
            departure_location: None,
            departure_notes: None,
            destination: None,
            arrival_time: None,
            arrival_location: None,
            arrival_gps_location: None,
            arrival_notes: None,
            route_photo_url: None,
            appearance_photo_url: None,
            status: AttendanceStatus::Pending,
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }
}
