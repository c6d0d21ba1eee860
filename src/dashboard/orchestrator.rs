//! Submit handlers: validate, claim the section's in-flight flag, make one
//! remote call, then merge the result into the dashboard.
//!
//! The dashboard lock is only held to read or merge state; it is released
//! before every remote call.

use crate::api::payloads::{
    AttendanceCreate, AttendancePatch, DailyReportCreate, PhotoKind, PreviousDayReportCreate,
    PreviousDayReportUpdate,
};
use crate::api::{ApiError, RemoteApi};
use crate::dashboard::Dashboard;
use crate::dashboard::sequencer::status_of;
use crate::models::{ActionType, PreviousDayReport};
use crate::utils::time::date_jst;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

/// Daily reports fetched per page, also used to tell whether today's report
/// is already in.
const REPORT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(String),
    #[error("送信中です。しばらくお待ちください")]
    AlreadySubmitting,
    #[error("{0}は現在実行できません")]
    NotAvailable(&'static str),
    #[error("本日の勤怠記録が読み込まれていません")]
    NoRecord,
    #[error("{operation}に失敗しました")]
    Remote {
        operation: &'static str,
        #[source]
        source: ApiError,
    },
}

impl SubmitError {
    /// The session is gone and the user has to sign in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            SubmitError::Remote {
                source: ApiError::Unauthorized,
                ..
            }
        )
    }
}

fn validation(err: anyhow::Error) -> SubmitError {
    SubmitError::Validation(err.to_string())
}

fn remote(operation: &'static str) -> impl FnOnce(ApiError) -> SubmitError {
    move |source| {
        if !matches!(source, ApiError::Unauthorized) {
            tracing::error!("Remote call failed ({}): {}", operation, source);
        }
        SubmitError::Remote { operation, source }
    }
}

/// Runs dashboard operations for one user against the backend.
pub struct Orchestrator<'a, A: RemoteApi + ?Sized> {
    api: &'a A,
    dashboard: &'a Mutex<Dashboard>,
}

impl<'a, A: RemoteApi + ?Sized> Orchestrator<'a, A> {
    pub fn new(api: &'a A, dashboard: &'a Mutex<Dashboard>) -> Self {
        Self { api, dashboard }
    }

    /// Fetches today's record, creating it when the backend has none, and
    /// the two report flags. Does nothing while a current record is held.
    /// Concurrent calls for the same dashboard fetch once.
    pub async fn load_today(&self, today: NaiveDate) -> Result<(), SubmitError> {
        let loading = {
            let dashboard = self.dashboard.lock().await;
            if !dashboard.needs_load(today) {
                return Ok(());
            }
            dashboard.attendance.loading.clone()
        };
        let _loading = loading.lock().await;
        // Another load may have finished while this one waited.
        if !self.dashboard.lock().await.needs_load(today) {
            return Ok(());
        }

        let operation = "勤怠記録の読み込み";
        let record = match self.api.today_attendance().await.map_err(remote(operation))? {
            Some(record) => record,
            None => {
                tracing::info!("No attendance record for {}, creating one", today);
                self.api
                    .create_attendance(&AttendanceCreate { date: today })
                    .await
                    .map_err(remote(operation))?
            }
        };
        let latest = self
            .api
            .latest_previous_day_report()
            .await
            .map_err(remote(operation))?;
        let reports = self
            .api
            .list_daily_reports(REPORT_PAGE_SIZE, 0)
            .await
            .map_err(remote(operation))?;

        let mut dashboard = self.dashboard.lock().await;
        let attendance = &mut dashboard.attendance;
        attendance.previous_day_done = latest
            .as_ref()
            .is_some_and(|report| report.covers(&record.id, record.date));
        attendance.daily_report_done = reports.iter().any(|r| r.is_submitted_for(record.date));
        attendance.latest_previous_day = latest;
        attendance.active_action = None;
        attendance.record = Some(record);

        dashboard.reports.reports = reports;
        dashboard.reports.loaded = true;
        Ok(())
    }

    pub async fn load_shifts(&self) -> Result<(), SubmitError> {
        let operation = "出社可能日の読み込み";
        let worksites = self.api.list_worksites().await.map_err(remote(operation))?;
        let availabilities = self
            .api
            .list_availabilities()
            .await
            .map_err(remote(operation))?;

        let mut dashboard = self.dashboard.lock().await;
        dashboard.shifts.worksites = worksites;
        dashboard.shifts.availabilities = availabilities;
        dashboard.shifts.loaded = true;
        Ok(())
    }

    pub async fn load_reports(&self) -> Result<(), SubmitError> {
        let reports = self
            .api
            .list_daily_reports(REPORT_PAGE_SIZE, 0)
            .await
            .map_err(remote("日報の読み込み"))?;

        let mut dashboard = self.dashboard.lock().await;
        dashboard.reports.reports = reports;
        dashboard.reports.loaded = true;
        Ok(())
    }

    /// Reports wake-up, departure or arrival at `at`. Only the stage the
    /// sequencer currently enables is accepted, judged against the record
    /// of the day `at` falls on.
    pub async fn submit_stage(
        &self,
        action: ActionType,
        at: DateTime<Utc>,
    ) -> Result<String, SubmitError> {
        if !action.is_timestamped() {
            return Err(SubmitError::NotAvailable(action.label()));
        }
        self.load_today(date_jst(at)).await?;

        let (record_id, _guard) = {
            let mut dashboard = self.dashboard.lock().await;
            let attendance = &mut dashboard.attendance;
            let record_id = attendance
                .record
                .as_ref()
                .map(|record| record.id.clone())
                .ok_or(SubmitError::NoRecord)?;

            let statuses = attendance.statuses();
            if !status_of(&statuses, action).is_some_and(|status| status.enabled) {
                return Err(SubmitError::NotAvailable(action.label()));
            }
            let guard = attendance
                .submitting
                .begin()
                .ok_or(SubmitError::AlreadySubmitting)?;
            attendance.active_action = Some(action);
            (record_id, guard)
        };

        let patch = AttendancePatch::stage(action, at);
        let result = self.api.update_attendance(&record_id, &patch).await;

        let mut dashboard = self.dashboard.lock().await;
        let mut record = match result {
            Ok(record) => record,
            Err(e) => {
                dashboard.attendance.active_action = None;
                return Err(remote(action.label())(e));
            }
        };
        if record.stage_time(action).is_none() {
            record.record_stage(action, at);
        }

        tracing::info!(
            "{} recorded for attendance record {} ({})",
            action.as_str(),
            record.id,
            record.status.as_str()
        );
        dashboard.attendance.record = Some(record);
        dashboard.attendance.active_action = None;

        if action == ActionType::Arrival {
            dashboard.open_report_form();
            return Ok(format!(
                "{}を送信しました！続けて日報を作成してください",
                action.label()
            ));
        }
        Ok(format!("{}を送信しました！", action.label()))
    }

    pub async fn submit_wake_up(&self, at: DateTime<Utc>) -> Result<String, SubmitError> {
        self.submit_stage(ActionType::WakeUp, at).await
    }

    pub async fn submit_departure(&self, at: DateTime<Utc>) -> Result<String, SubmitError> {
        self.submit_stage(ActionType::Departure, at).await
    }

    pub async fn submit_arrival(&self, at: DateTime<Utc>) -> Result<String, SubmitError> {
        self.submit_stage(ActionType::Arrival, at).await
    }

    /// Uploads both photos, then files the previous-day report from the
    /// form buffer for the cycle of `report_date`.
    pub async fn submit_previous_day(&self, report_date: NaiveDate) -> Result<String, SubmitError> {
        let label = ActionType::PreviousDay.label();
        self.load_today(report_date).await?;
        let (input, _guard) = {
            let dashboard = self.dashboard.lock().await;
            let attendance = &dashboard.attendance;
            if attendance.previous_day_done {
                return Err(SubmitError::NotAvailable(label));
            }
            let input = attendance.previous_day_form.validate().map_err(validation)?;
            let guard = attendance
                .submitting
                .begin()
                .ok_or(SubmitError::AlreadySubmitting)?;
            (input, guard)
        };

        let operation = "前日報告の送信";
        let appearance = self
            .api
            .upload_photo(PhotoKind::Appearance, &input.appearance_photo)
            .await
            .map_err(remote("身だしなみ写真のアップロード"))?;
        let route = self
            .api
            .upload_photo(PhotoKind::Route, &input.route_photo)
            .await
            .map_err(remote("経路写真のアップロード"))?;

        let body = PreviousDayReportCreate {
            report_date,
            next_wake_up_time: input.next_wake_up_time,
            next_departure_time: input.next_departure_time,
            next_arrival_time: input.next_arrival_time,
            appearance_photo_url: appearance.url,
            route_photo_url: route.url,
            notes: input.notes,
        };
        let report = self
            .api
            .create_previous_day_report(&body)
            .await
            .map_err(remote(operation))?;

        tracing::info!("Previous-day report {} filed for {}", report.id, report.report_date);
        let mut dashboard = self.dashboard.lock().await;
        let attendance = &mut dashboard.attendance;
        attendance.previous_day_done = true;
        attendance.latest_previous_day = Some(report);
        attendance.previous_day_form.clear();
        attendance.active_action = None;
        Ok(format!("{}を送信しました！", label))
    }

    /// Changes the planned times or notes of the latest previous-day report.
    pub async fn revise_previous_day(
        &self,
        update: PreviousDayReportUpdate,
    ) -> Result<String, SubmitError> {
        let (report_id, _guard) = {
            let dashboard = self.dashboard.lock().await;
            let attendance = &dashboard.attendance;
            let report_id = attendance
                .latest_previous_day
                .as_ref()
                .map(|report| report.id.clone())
                .ok_or_else(|| SubmitError::Validation("修正できる前日報告がありません".to_string()))?;
            if update.is_empty() {
                return Err(SubmitError::Validation(
                    "変更する項目を入力してください".to_string(),
                ));
            }
            let guard = attendance
                .submitting
                .begin()
                .ok_or(SubmitError::AlreadySubmitting)?;
            (report_id, guard)
        };

        let report = self
            .api
            .update_previous_day_report(&report_id, &update)
            .await
            .map_err(remote("前日報告の修正"))?;

        self.dashboard.lock().await.attendance.latest_previous_day = Some(report);
        Ok("前日報告を修正しました！".to_string())
    }

    /// Deletes the latest previous-day report. Only possible until wake-up
    /// has been reported for the cycle it covers.
    pub async fn withdraw_previous_day(&self) -> Result<String, SubmitError> {
        let (report_id, _guard) = {
            let dashboard = self.dashboard.lock().await;
            let attendance = &dashboard.attendance;
            let report_id = attendance
                .latest_previous_day
                .as_ref()
                .map(|report| report.id.clone())
                .ok_or_else(|| {
                    SubmitError::Validation("取り消せる前日報告がありません".to_string())
                })?;
            let woken = attendance
                .record
                .as_ref()
                .is_some_and(|record| record.wake_up_time.is_some());
            if attendance.previous_day_done && woken {
                return Err(SubmitError::Validation(
                    "起床報告後は前日報告を取り消せません".to_string(),
                ));
            }
            let guard = attendance
                .submitting
                .begin()
                .ok_or(SubmitError::AlreadySubmitting)?;
            (report_id, guard)
        };

        self.api
            .delete_previous_day_report(&report_id)
            .await
            .map_err(remote("前日報告の取り消し"))?;

        tracing::info!("Previous-day report {} withdrawn", report_id);
        let mut dashboard = self.dashboard.lock().await;
        dashboard.attendance.latest_previous_day = None;
        dashboard.attendance.previous_day_done = false;
        Ok("前日報告を取り消しました".to_string())
    }

    pub async fn previous_day_history(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PreviousDayReport>, SubmitError> {
        self.api
            .list_previous_day_reports(limit, offset)
            .await
            .map_err(remote("前日報告履歴の取得"))
    }

    pub async fn previous_day_report(
        &self,
        report_id: &str,
    ) -> Result<PreviousDayReport, SubmitError> {
        self.api
            .get_previous_day_report(report_id)
            .await
            .map_err(remote("前日報告の取得"))
    }

    pub async fn submit_availability(&self, today: NaiveDate) -> Result<String, SubmitError> {
        let (body, _guard) = {
            let dashboard = self.dashboard.lock().await;
            let shifts = &dashboard.shifts;
            let body = shifts
                .form
                .validate(&shifts.worksites, today)
                .map_err(validation)?;
            let guard = shifts
                .submitting
                .begin()
                .ok_or(SubmitError::AlreadySubmitting)?;
            (body, guard)
        };

        let availability = self
            .api
            .create_availability(&body)
            .await
            .map_err(remote("出社可能日の登録"))?;

        let mut dashboard = self.dashboard.lock().await;
        dashboard.shifts.availabilities.push(availability);
        dashboard.shifts.form.cancel();
        Ok("出社可能日を登録しました！".to_string())
    }

    /// Files the daily report for today's attendance cycle.
    pub async fn submit_daily_report(&self, today: NaiveDate) -> Result<String, SubmitError> {
        let content = self
            .dashboard
            .lock()
            .await
            .reports
            .form
            .validate()
            .map_err(validation)?;
        self.load_today(today).await?;

        let (body, _guard) = {
            let dashboard = self.dashboard.lock().await;
            let date = dashboard
                .attendance
                .record
                .as_ref()
                .map(|record| record.date)
                .ok_or(SubmitError::NoRecord)?;
            let guard = dashboard
                .reports
                .submitting
                .begin()
                .ok_or(SubmitError::AlreadySubmitting)?;
            (DailyReportCreate { date, content }, guard)
        };

        let report = self
            .api
            .create_daily_report(&body)
            .await
            .map_err(remote("日報の送信"))?;

        tracing::info!(
            "Daily report {} filed for {} ({})",
            report.id,
            report.date,
            report.status.as_str()
        );
        let mut dashboard = self.dashboard.lock().await;
        if dashboard
            .attendance
            .record
            .as_ref()
            .is_some_and(|record| report.is_submitted_for(record.date))
        {
            dashboard.attendance.daily_report_done = true;
        }
        dashboard.reports.reports.insert(0, report);
        dashboard.reports.form.cancel();
        Ok("日報を送信しました！".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::payloads::{AvailabilityCreate, PhotoAttachment, UploadedPhoto};
    use crate::dashboard::forms::fixtures::{filled_previous_day_form, worksite};
    use crate::dashboard::sequencer::next_action;
    use crate::models::attendance::fixtures::pending_record;
    use crate::models::{
        AttendanceRecord, AttendanceStatus, Availability, DailyReport, HomeTab, ReportStatus,
        Worksite,
    };
    use async_trait::async_trait;
    use chrono::{NaiveTime, TimeZone};
    use serde_json::{Value, json};
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    /// In-memory backend. Every call is recorded by name; names listed in
    /// `failing` answer with a server error.
    #[derive(Default)]
    struct FakeApi {
        today: Option<AttendanceRecord>,
        latest: Option<PreviousDayReport>,
        daily_reports: Vec<DailyReport>,
        failing: HashSet<&'static str>,
        calls: StdMutex<Vec<&'static str>>,
        bodies: StdMutex<Vec<Value>>,
    }

    impl FakeApi {
        fn call(&self, name: &'static str) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(name);
            if self.failing.contains(name) {
                return Err(ApiError::Status {
                    status: 500,
                    message: "internal error".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, name: &str) -> usize {
            self.calls().iter().filter(|c| **c == name).count()
        }

        fn keep(&self, body: &impl serde::Serialize) {
            self.bodies
                .lock()
                .unwrap()
                .push(serde_json::to_value(body).unwrap());
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 18, 21, 5, 0).unwrap()
    }

    fn previous_day_report(id: &str, report_date: NaiveDate) -> PreviousDayReport {
        PreviousDayReport {
            id: id.to_string(),
            user_id: "staff-1".to_string(),
            report_date,
            next_wake_up_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            next_departure_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            next_arrival_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            appearance_photo_url: "https://photos.example/appearance.jpg".to_string(),
            route_photo_url: "https://photos.example/route.jpg".to_string(),
            notes: None,
            actual_attendance_record_id: None,
            created_at: at(),
            updated_at: at(),
        }
    }

    #[async_trait]
    impl RemoteApi for FakeApi {
        async fn today_attendance(&self) -> Result<Option<AttendanceRecord>, ApiError> {
            self.call("today_attendance")?;
            tokio::task::yield_now().await;
            Ok(self.today.clone())
        }

        async fn create_attendance(
            &self,
            body: &AttendanceCreate,
        ) -> Result<AttendanceRecord, ApiError> {
            self.call("create_attendance")?;
            let mut record = pending_record();
            record.date = body.date;
            Ok(record)
        }

        async fn update_attendance(
            &self,
            record_id: &str,
            body: &AttendancePatch,
        ) -> Result<AttendanceRecord, ApiError> {
            self.call("update_attendance")?;
            self.keep(body);
            // Answers with the record as it was before the patch.
            let mut record = self.today.clone().unwrap_or_else(pending_record);
            record.id = record_id.to_string();
            Ok(record)
        }

        async fn upload_photo(
            &self,
            kind: PhotoKind,
            photo: &PhotoAttachment,
        ) -> Result<UploadedPhoto, ApiError> {
            self.call("upload_photo")?;
            Ok(UploadedPhoto {
                url: format!("https://photos.example/{}/{}", kind.as_str(), photo.filename),
            })
        }

        async fn create_previous_day_report(
            &self,
            body: &PreviousDayReportCreate,
        ) -> Result<PreviousDayReport, ApiError> {
            self.call("create_previous_day_report")?;
            self.keep(body);
            Ok(previous_day_report("p-new", body.report_date))
        }

        async fn list_previous_day_reports(
            &self,
            _limit: u32,
            _offset: u32,
        ) -> Result<Vec<PreviousDayReport>, ApiError> {
            self.call("list_previous_day_reports")?;
            Ok(self.latest.clone().into_iter().collect())
        }

        async fn latest_previous_day_report(&self) -> Result<Option<PreviousDayReport>, ApiError> {
            self.call("latest_previous_day_report")?;
            Ok(self.latest.clone())
        }

        async fn get_previous_day_report(
            &self,
            report_id: &str,
        ) -> Result<PreviousDayReport, ApiError> {
            self.call("get_previous_day_report")?;
            Ok(previous_day_report(report_id, pending_record().date))
        }

        async fn update_previous_day_report(
            &self,
            report_id: &str,
            body: &PreviousDayReportUpdate,
        ) -> Result<PreviousDayReport, ApiError> {
            self.call("update_previous_day_report")?;
            self.keep(body);
            let mut report = previous_day_report(report_id, pending_record().date);
            report.notes = body.notes.clone();
            Ok(report)
        }

        async fn delete_previous_day_report(&self, _report_id: &str) -> Result<(), ApiError> {
            self.call("delete_previous_day_report")
        }

        async fn list_worksites(&self) -> Result<Vec<Worksite>, ApiError> {
            self.call("list_worksites")?;
            Ok(vec![worksite()])
        }

        async fn list_availabilities(&self) -> Result<Vec<Availability>, ApiError> {
            self.call("list_availabilities")?;
            Ok(Vec::new())
        }

        async fn create_availability(
            &self,
            body: &AvailabilityCreate,
        ) -> Result<Availability, ApiError> {
            self.call("create_availability")?;
            self.keep(body);
            Ok(Availability {
                id: "av-1".to_string(),
                date: body.date,
                worksite: worksite(),
                notes: body.notes.clone(),
            })
        }

        async fn list_daily_reports(
            &self,
            _limit: u32,
            _offset: u32,
        ) -> Result<Vec<DailyReport>, ApiError> {
            self.call("list_daily_reports")?;
            Ok(self.daily_reports.clone())
        }

        async fn create_daily_report(
            &self,
            body: &DailyReportCreate,
        ) -> Result<DailyReport, ApiError> {
            self.call("create_daily_report")?;
            self.keep(body);
            Ok(DailyReport {
                id: "dr-1".to_string(),
                date: body.date,
                content: body.content.clone(),
                status: ReportStatus::Submitted,
                submitted_at: Some(at()),
            })
        }
    }

    fn dashboard_with(record: AttendanceRecord, previous_day_done: bool) -> Mutex<Dashboard> {
        let mut dashboard = Dashboard::default();
        dashboard.attendance.record = Some(record);
        dashboard.attendance.previous_day_done = previous_day_done;
        Mutex::new(dashboard)
    }

    fn today() -> NaiveDate {
        pending_record().date
    }

    #[tokio::test]
    async fn load_creates_missing_record_and_derives_flags() {
        let api = FakeApi {
            latest: Some(previous_day_report("p-1", today())),
            ..Default::default()
        };
        let dashboard = Mutex::new(Dashboard::default());
        let orchestrator = Orchestrator::new(&api, &dashboard);

        orchestrator.load_today(today()).await.unwrap();
        assert_eq!(api.count("create_attendance"), 1);
        {
            let state = dashboard.lock().await;
            assert!(state.attendance.previous_day_done);
            assert!(!state.attendance.daily_report_done);
            let statuses = state.attendance.statuses();
            assert_eq!(
                next_action(&statuses).map(|s| s.action_type),
                Some(ActionType::WakeUp)
            );
        }

        // A current record is held, so nothing is fetched again.
        orchestrator.load_today(today()).await.unwrap();
        assert_eq!(api.count("today_attendance"), 1);
    }

    #[tokio::test]
    async fn load_picks_up_todays_submitted_report() {
        let api = FakeApi {
            today: Some(pending_record()),
            daily_reports: vec![DailyReport {
                id: "dr-0".to_string(),
                date: today(),
                content: "完了".to_string(),
                status: ReportStatus::Submitted,
                submitted_at: Some(at()),
            }],
            ..Default::default()
        };
        let dashboard = Mutex::new(Dashboard::default());
        Orchestrator::new(&api, &dashboard)
            .load_today(today())
            .await
            .unwrap();

        let state = dashboard.lock().await;
        assert!(state.attendance.daily_report_done);
        assert!(!state.attendance.previous_day_done);
        assert!(state.reports.loaded);
        assert_eq!(api.count("create_attendance"), 0);
    }

    #[tokio::test]
    async fn previous_day_submit_creates_once_and_enables_wake_up() {
        let api = FakeApi::default();
        let dashboard = dashboard_with(pending_record(), false);
        dashboard.lock().await.attendance.previous_day_form = filled_previous_day_form();
        let orchestrator = Orchestrator::new(&api, &dashboard);

        let message = orchestrator.submit_previous_day(today()).await.unwrap();
        assert_eq!(message, "前日報告を送信しました！");
        assert_eq!(api.count("create_previous_day_report"), 1);
        assert_eq!(api.count("upload_photo"), 2);

        let body = api.bodies.lock().unwrap()[0].clone();
        assert_eq!(
            body,
            json!({
                "report_date": "2025-12-19",
                "next_wake_up_time": "06:00:00",
                "next_departure_time": "07:30:00",
                "next_arrival_time": "09:00:00",
                "appearance_photo_url": "https://photos.example/appearance/appearance.jpg",
                "route_photo_url": "https://photos.example/route/route.jpg",
                "notes": "制服クリーニング済み",
            })
        );

        let state = dashboard.lock().await;
        assert!(state.attendance.previous_day_done);
        assert!(state.attendance.previous_day_form.appearance_photo.is_none());
        assert!(state.attendance.previous_day_form.next_wake_up_time.is_empty());
        assert!(!state.attendance.is_submitting());
        let statuses = state.attendance.statuses();
        assert_eq!(
            next_action(&statuses).map(|s| s.action_type),
            Some(ActionType::WakeUp)
        );
    }

    #[tokio::test]
    async fn previous_day_without_route_photo_never_calls_remote() {
        let api = FakeApi::default();
        let dashboard = dashboard_with(pending_record(), false);
        let mut form = filled_previous_day_form();
        form.route_photo = None;
        dashboard.lock().await.attendance.previous_day_form = form;

        let err = Orchestrator::new(&api, &dashboard)
            .submit_previous_day(today())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));
        assert_eq!(err.to_string(), "経路写真を添付してください");
        assert!(api.calls().is_empty());

        let state = dashboard.lock().await;
        assert!(!state.attendance.previous_day_done);
        assert_eq!(state.attendance.previous_day_form.next_wake_up_time, "06:00");
    }

    #[tokio::test]
    async fn failed_wake_up_leaves_record_unchanged() {
        let api = FakeApi {
            failing: HashSet::from(["update_attendance"]),
            ..Default::default()
        };
        let dashboard = dashboard_with(pending_record(), true);

        let err = Orchestrator::new(&api, &dashboard)
            .submit_wake_up(at())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "起床報告に失敗しました");
        assert!(!err.is_unauthorized());

        let state = dashboard.lock().await;
        assert_eq!(state.attendance.record, Some(pending_record()));
        assert!(!state.attendance.is_submitting());
        assert!(state.attendance.active_action.is_none());
    }

    #[tokio::test]
    async fn stage_success_merges_missing_timestamp() {
        let mut record = pending_record();
        record.wake_up_time = Some(at());
        record.status = AttendanceStatus::Partial;
        let api = FakeApi {
            today: Some(record.clone()),
            ..Default::default()
        };
        let dashboard = dashboard_with(record, true);

        let departed = Utc.with_ymd_and_hms(2025, 12, 18, 22, 30, 0).unwrap();
        Orchestrator::new(&api, &dashboard)
            .submit_departure(departed)
            .await
            .unwrap();

        assert_eq!(
            api.bodies.lock().unwrap()[0],
            json!({ "departure_time": "2025-12-18T22:30:00Z", "status": "partial" })
        );
        let state = dashboard.lock().await;
        let record = state.attendance.record.as_ref().unwrap();
        assert_eq!(record.departure_time, Some(departed));
        assert_eq!(record.status, AttendanceStatus::Partial);
        assert_eq!(state.active_tab, HomeTab::Attendance);
    }

    #[tokio::test]
    async fn stage_out_of_order_is_rejected() {
        let api = FakeApi::default();
        let dashboard = dashboard_with(pending_record(), false);
        let orchestrator = Orchestrator::new(&api, &dashboard);

        let err = orchestrator.submit_wake_up(at()).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotAvailable("起床報告")));
        let err = orchestrator.submit_stage(ActionType::Report, at()).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotAvailable(_)));
        assert!(api.calls().is_empty());

        // Nothing held yet: today's record is fetched before the check.
        let empty = Mutex::new(Dashboard::default());
        let err = Orchestrator::new(&api, &empty)
            .submit_wake_up(at())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::NotAvailable("起床報告")));
        assert_eq!(api.count("create_attendance"), 1);
        assert_eq!(api.count("update_attendance"), 0);
    }

    #[tokio::test]
    async fn stale_record_is_replaced_before_a_stage() {
        let mut yesterday = pending_record();
        yesterday.wake_up_time = Some(at());
        yesterday.status = AttendanceStatus::Partial;
        let api = FakeApi::default();
        let dashboard = dashboard_with(yesterday, true);

        // 07:30 JST on the following day.
        let next_morning = Utc.with_ymd_and_hms(2025, 12, 19, 22, 30, 0).unwrap();
        let err = Orchestrator::new(&api, &dashboard)
            .submit_departure(next_morning)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::NotAvailable("出発報告")));
        assert_eq!(api.count("update_attendance"), 0);
        assert_eq!(api.count("create_attendance"), 1);

        let state = dashboard.lock().await;
        let record = state.attendance.record.as_ref().unwrap();
        assert_eq!(record.date, today().succ_opt().unwrap());
        assert!(record.wake_up_time.is_none());
        assert!(!state.attendance.previous_day_done);
    }

    #[tokio::test]
    async fn yesterdays_plan_does_not_count_for_today() {
        let api = FakeApi {
            latest: Some(previous_day_report("p-1", today())),
            ..Default::default()
        };
        let tomorrow = today().succ_opt().unwrap();
        let dashboard = Mutex::new(Dashboard::default());
        Orchestrator::new(&api, &dashboard)
            .load_today(tomorrow)
            .await
            .unwrap();

        let state = dashboard.lock().await;
        assert!(!state.attendance.previous_day_done);
        let statuses = state.attendance.statuses();
        assert_eq!(
            next_action(&statuses).map(|s| s.action_type),
            Some(ActionType::PreviousDay)
        );
    }

    #[tokio::test]
    async fn concurrent_loads_create_one_record() {
        let api = FakeApi::default();
        let dashboard = Mutex::new(Dashboard::default());
        let first = Orchestrator::new(&api, &dashboard);
        let second = Orchestrator::new(&api, &dashboard);

        let (a, b) = tokio::join!(first.load_today(today()), second.load_today(today()));
        a.unwrap();
        b.unwrap();
        assert_eq!(api.count("today_attendance"), 1);
        assert_eq!(api.count("create_attendance"), 1);
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected() {
        let api = FakeApi::default();
        let dashboard = dashboard_with(pending_record(), true);
        let held = dashboard.lock().await.attendance.submitting.begin().unwrap();

        let err = Orchestrator::new(&api, &dashboard)
            .submit_wake_up(at())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::AlreadySubmitting));
        assert!(api.calls().is_empty());

        drop(held);
        Orchestrator::new(&api, &dashboard)
            .submit_wake_up(at())
            .await
            .unwrap();
        assert_eq!(api.count("update_attendance"), 1);
    }

    #[tokio::test]
    async fn arrival_opens_the_report_form() {
        let mut record = pending_record();
        record.wake_up_time = Some(at());
        record.departure_time = Some(at());
        let api = FakeApi {
            today: Some(record.clone()),
            ..Default::default()
        };
        let dashboard = dashboard_with(record, true);
        dashboard.lock().await.reports.form.content = "下書き中".to_string();

        let message = Orchestrator::new(&api, &dashboard)
            .submit_arrival(at())
            .await
            .unwrap();
        assert!(message.starts_with("到着報告を送信しました！"));

        let state = dashboard.lock().await;
        assert_eq!(state.active_tab, HomeTab::Reports);
        assert!(state.reports.form.visible);
        assert_eq!(state.reports.form.content, "下書き中");
        assert_eq!(
            state.attendance.record.as_ref().map(|r| r.status),
            Some(AttendanceStatus::Complete)
        );
        let statuses = state.attendance.statuses();
        assert_eq!(
            next_action(&statuses).map(|s| s.action_type),
            Some(ActionType::Report)
        );
    }

    #[tokio::test]
    async fn daily_report_completes_the_cycle() {
        let api = FakeApi::default();
        let mut record = pending_record();
        record.wake_up_time = Some(at());
        record.departure_time = Some(at());
        record.arrival_time = Some(at());
        let dashboard = dashboard_with(record, true);
        {
            let mut state = dashboard.lock().await;
            state.open_report_form();
            state.reports.form.content = "光回線の開通工事を2件対応".to_string();
        }

        Orchestrator::new(&api, &dashboard)
            .submit_daily_report(today())
            .await
            .unwrap();

        let state = dashboard.lock().await;
        assert!(state.attendance.daily_report_done);
        assert!(!state.reports.form.visible);
        assert!(state.reports.form.content.is_empty());
        assert_eq!(state.reports.reports.len(), 1);
        let statuses = state.attendance.statuses();
        assert!(crate::dashboard::sequencer::all_completed(&statuses));
        assert!(statuses.iter().all(|s| !s.enabled));
    }

    #[tokio::test]
    async fn daily_report_after_midnight_is_filed_for_the_new_day() {
        let api = FakeApi::default();
        let mut record = pending_record();
        record.wake_up_time = Some(at());
        record.departure_time = Some(at());
        record.arrival_time = Some(at());
        let dashboard = dashboard_with(record, true);
        dashboard.lock().await.reports.form.content = "夜間作業の報告".to_string();

        let tomorrow = today().succ_opt().unwrap();
        Orchestrator::new(&api, &dashboard)
            .submit_daily_report(tomorrow)
            .await
            .unwrap();

        assert_eq!(api.count("create_attendance"), 1);
        assert_eq!(
            api.bodies.lock().unwrap()[0],
            json!({ "date": "2025-12-20", "content": "夜間作業の報告" })
        );
        let state = dashboard.lock().await;
        assert_eq!(
            state.attendance.record.as_ref().map(|r| r.date),
            Some(tomorrow)
        );
        assert!(state.attendance.daily_report_done);
    }

    #[tokio::test]
    async fn availability_is_appended_and_form_closed() {
        let api = FakeApi::default();
        let dashboard = Mutex::new(Dashboard::default());
        let orchestrator = Orchestrator::new(&api, &dashboard);
        orchestrator.load_shifts().await.unwrap();
        {
            let mut state = dashboard.lock().await;
            state.shifts.form.visible = true;
            state.shifts.form.selected_date = "2025-12-24".to_string();
            state.shifts.form.selected_worksite = Some("ws-1".to_string());
        }

        orchestrator.submit_availability(today()).await.unwrap();

        let state = dashboard.lock().await;
        assert_eq!(state.shifts.availabilities.len(), 1);
        assert!(!state.shifts.form.visible);
        assert!(state.shifts.form.selected_worksite.is_none());
        assert_eq!(
            api.bodies.lock().unwrap()[0],
            json!({ "date": "2025-12-24", "worksite_id": "ws-1", "notes": null })
        );
    }

    #[tokio::test]
    async fn withdraw_is_refused_after_wake_up() {
        let api = FakeApi::default();
        let mut record = pending_record();
        record.wake_up_time = Some(at());
        let dashboard = dashboard_with(record, true);
        dashboard.lock().await.attendance.latest_previous_day =
            Some(previous_day_report("p-1", today()));
        let orchestrator = Orchestrator::new(&api, &dashboard);

        assert!(orchestrator.withdraw_previous_day().await.is_err());
        assert_eq!(api.count("delete_previous_day_report"), 0);

        dashboard.lock().await.attendance.record = Some(pending_record());
        orchestrator.withdraw_previous_day().await.unwrap();
        let state = dashboard.lock().await;
        assert!(!state.attendance.previous_day_done);
        assert!(state.attendance.latest_previous_day.is_none());
    }

    #[tokio::test]
    async fn revise_updates_the_latest_report() {
        let api = FakeApi::default();
        let dashboard = dashboard_with(pending_record(), true);
        let orchestrator = Orchestrator::new(&api, &dashboard);
        let update = PreviousDayReportUpdate {
            notes: Some("雨天のため早めに出発".to_string()),
            ..Default::default()
        };

        assert!(orchestrator.revise_previous_day(update.clone()).await.is_err());

        dashboard.lock().await.attendance.latest_previous_day =
            Some(previous_day_report("p-1", today()));
        orchestrator.revise_previous_day(update).await.unwrap();
        assert_eq!(
            api.bodies.lock().unwrap()[0],
            json!({ "notes": "雨天のため早めに出発" })
        );
        let state = dashboard.lock().await;
        let latest = state.attendance.latest_previous_day.as_ref().unwrap();
        assert_eq!(latest.notes.as_deref(), Some("雨天のため早めに出発"));
    }

    #[tokio::test]
    async fn unauthorized_is_reported_as_such() {
        struct Expired;

        #[async_trait]
        impl RemoteApi for Expired {
            async fn today_attendance(&self) -> Result<Option<AttendanceRecord>, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn create_attendance(
                &self,
                _body: &AttendanceCreate,
            ) -> Result<AttendanceRecord, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn update_attendance(
                &self,
                _record_id: &str,
                _body: &AttendancePatch,
            ) -> Result<AttendanceRecord, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn upload_photo(
                &self,
                _kind: PhotoKind,
                _photo: &PhotoAttachment,
            ) -> Result<UploadedPhoto, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn create_previous_day_report(
                &self,
                _body: &PreviousDayReportCreate,
            ) -> Result<PreviousDayReport, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn list_previous_day_reports(
                &self,
                _limit: u32,
                _offset: u32,
            ) -> Result<Vec<PreviousDayReport>, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn latest_previous_day_report(
                &self,
            ) -> Result<Option<PreviousDayReport>, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn get_previous_day_report(
                &self,
                _report_id: &str,
            ) -> Result<PreviousDayReport, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn update_previous_day_report(
                &self,
                _report_id: &str,
                _body: &PreviousDayReportUpdate,
            ) -> Result<PreviousDayReport, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn delete_previous_day_report(&self, _report_id: &str) -> Result<(), ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn list_worksites(&self) -> Result<Vec<Worksite>, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn list_availabilities(&self) -> Result<Vec<Availability>, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn create_availability(
                &self,
                _body: &AvailabilityCreate,
            ) -> Result<Availability, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn list_daily_reports(
                &self,
                _limit: u32,
                _offset: u32,
            ) -> Result<Vec<DailyReport>, ApiError> {
                Err(ApiError::Unauthorized)
            }

            async fn create_daily_report(
                &self,
                _body: &DailyReportCreate,
            ) -> Result<DailyReport, ApiError> {
                Err(ApiError::Unauthorized)
            }
        }

        let dashboard = Mutex::new(Dashboard::default());
        let err = Orchestrator::new(&Expired, &dashboard)
            .load_today(today())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert!(dashboard.lock().await.attendance.record.is_none());
    }
}
