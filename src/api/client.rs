use crate::api::payloads::{
    AttendanceCreate, AttendancePatch, AvailabilityCreate, DailyReportCreate, PhotoAttachment,
    PhotoKind, PreviousDayReportCreate, PreviousDayReportUpdate, UploadedPhoto, decode_payload,
};
use crate::api::{ApiError, RemoteApi};
use crate::auth::AuthContext;
use crate::config::Config;
use crate::models::{AttendanceRecord, Availability, DailyReport, PreviousDayReport, Worksite};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP client for the attendance backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthContext>,
}

impl ApiClient {
    pub fn new(config: &Config, auth: Arc<AuthContext>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()?;

        Ok(Self::with_client(http, &config.api_url, auth))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, auth: Arc<AuthContext>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// View of the client that authenticates as the given Discord user.
    pub fn for_user(&self, discord_id: &str) -> UserApi {
        UserApi {
            client: self.clone(),
            discord_id: discord_id.to_string(),
        }
    }
}

pub struct UserApi {
    client: ApiClient,
    discord_id: String,
}

impl UserApi {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.client.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.client.http.get(self.url(path))).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.client.http.post(self.url(path)).json(body))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.client.http.put(self.url(path)).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.client.http.delete(self.url(path))).await
    }

    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        self.send(self.client.http.post(self.url(path)).multipart(form))
            .await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match self.client.auth.id_token(&self.discord_id).await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url().path());

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                "Backend rejected token, signing out discord_id={}",
                self.discord_id
            );
            self.client.auth.logout(&self.discord_id).await;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        decode_payload(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteApi for UserApi {
    async fn today_attendance(&self) -> Result<Option<AttendanceRecord>, ApiError> {
        self.get("/api/attendance-records/today/me").await
    }

    async fn create_attendance(
        &self,
        body: &AttendanceCreate,
    ) -> Result<AttendanceRecord, ApiError> {
        self.post("/api/attendance-records", body).await
    }

    async fn update_attendance(
        &self,
        record_id: &str,
        body: &AttendancePatch,
    ) -> Result<AttendanceRecord, ApiError> {
        self.put(&format!("/api/attendance-records/{}", record_id), body)
            .await
    }

    async fn upload_photo(
        &self,
        kind: PhotoKind,
        photo: &PhotoAttachment,
    ) -> Result<UploadedPhoto, ApiError> {
        let mut part = Part::bytes(photo.data.clone()).file_name(photo.filename.clone());
        if let Some(content_type) = &photo.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().text("kind", kind.as_str()).part("file", part);

        self.upload("/api/uploads/photos", form).await
    }

    async fn create_previous_day_report(
        &self,
        body: &PreviousDayReportCreate,
    ) -> Result<PreviousDayReport, ApiError> {
        self.post("/api/previous-day-reports", body).await
    }

    async fn list_previous_day_reports(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PreviousDayReport>, ApiError> {
        self.get(&format!(
            "/api/previous-day-reports?limit={}&offset={}",
            limit, offset
        ))
        .await
    }

    async fn latest_previous_day_report(&self) -> Result<Option<PreviousDayReport>, ApiError> {
        self.get("/api/previous-day-reports/latest/me").await
    }

    async fn get_previous_day_report(
        &self,
        report_id: &str,
    ) -> Result<PreviousDayReport, ApiError> {
        self.get(&format!("/api/previous-day-reports/{}", report_id))
            .await
    }

    async fn update_previous_day_report(
        &self,
        report_id: &str,
        body: &PreviousDayReportUpdate,
    ) -> Result<PreviousDayReport, ApiError> {
        self.put(&format!("/api/previous-day-reports/{}", report_id), body)
            .await
    }

    async fn delete_previous_day_report(&self, report_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/previous-day-reports/{}", report_id))
            .await
    }

    async fn list_worksites(&self) -> Result<Vec<Worksite>, ApiError> {
        self.get("/api/worksites").await
    }

    async fn list_availabilities(&self) -> Result<Vec<Availability>, ApiError> {
        self.get("/api/staff-availabilities").await
    }

    async fn create_availability(
        &self,
        body: &AvailabilityCreate,
    ) -> Result<Availability, ApiError> {
        self.post("/api/staff-availabilities", body).await
    }

    async fn list_daily_reports(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<DailyReport>, ApiError> {
        self.get(&format!("/api/daily-reports?limit={}&offset={}", limit, offset))
            .await
    }

    async fn create_daily_report(&self, body: &DailyReportCreate) -> Result<DailyReport, ApiError> {
        self.post("/api/daily-reports", body).await
    }
}
