pub mod client;
pub mod payloads;

pub use client::{ApiClient, UserApi};

use crate::models::{
    AttendanceRecord, Availability, DailyReport, PreviousDayReport, Worksite,
};
use async_trait::async_trait;
use payloads::{
    AttendanceCreate, AttendancePatch, AvailabilityCreate, DailyReportCreate, PhotoAttachment,
    PhotoKind, PreviousDayReportCreate, PreviousDayReportUpdate, UploadedPhoto,
};
use thiserror::Error;

/// Remote call failures. Callers only tell success from failure; the one
/// kind handled separately is `Unauthorized`, after which the user's session
/// is already gone.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Typed RPC boundary to the attendance backend, scoped to one signed-in user.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn today_attendance(&self) -> Result<Option<AttendanceRecord>, ApiError>;
    async fn create_attendance(
        &self,
        body: &AttendanceCreate,
    ) -> Result<AttendanceRecord, ApiError>;
    async fn update_attendance(
        &self,
        record_id: &str,
        body: &AttendancePatch,
    ) -> Result<AttendanceRecord, ApiError>;

    async fn upload_photo(
        &self,
        kind: PhotoKind,
        photo: &PhotoAttachment,
    ) -> Result<UploadedPhoto, ApiError>;

    async fn create_previous_day_report(
        &self,
        body: &PreviousDayReportCreate,
    ) -> Result<PreviousDayReport, ApiError>;
    async fn list_previous_day_reports(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PreviousDayReport>, ApiError>;
    async fn latest_previous_day_report(&self) -> Result<Option<PreviousDayReport>, ApiError>;
    async fn get_previous_day_report(&self, report_id: &str) -> Result<PreviousDayReport, ApiError>;
    async fn update_previous_day_report(
        &self,
        report_id: &str,
        body: &PreviousDayReportUpdate,
    ) -> Result<PreviousDayReport, ApiError>;
    async fn delete_previous_day_report(&self, report_id: &str) -> Result<(), ApiError>;

    async fn list_worksites(&self) -> Result<Vec<Worksite>, ApiError>;
    async fn list_availabilities(&self) -> Result<Vec<Availability>, ApiError>;
    async fn create_availability(
        &self,
        body: &AvailabilityCreate,
    ) -> Result<Availability, ApiError>;

    async fn list_daily_reports(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<DailyReport>, ApiError>;
    async fn create_daily_report(&self, body: &DailyReportCreate) -> Result<DailyReport, ApiError>;
}
