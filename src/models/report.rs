use crate::models::status::ReportStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// 前日報告: next-day plan with the two required photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousDayReport {
    pub id: String,
    pub user_id: String,
    pub report_date: NaiveDate,
    pub next_wake_up_time: NaiveTime,
    pub next_departure_time: NaiveTime,
    pub next_arrival_time: NaiveTime,
    pub appearance_photo_url: String,
    pub route_photo_url: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub actual_attendance_record_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PreviousDayReport {
    /// Whether this report is the plan for the given attendance cycle.
    ///
    /// A report is linked explicitly once the backend ties it to a record;
    /// until then it counts only for the cycle of the day it was filed.
    pub fn covers(&self, record_id: &str, cycle_date: NaiveDate) -> bool {
        match &self.actual_attendance_record_id {
            Some(linked) => linked == record_id,
            None => self.report_date == cycle_date,
        }
    }
}

/// 日報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl DailyReport {
    pub fn is_submitted_for(&self, date: NaiveDate) -> bool {
        self.date == date && self.status == ReportStatus::Submitted
    }
}
