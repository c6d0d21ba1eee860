pub mod forms;
pub mod orchestrator;
pub mod sequencer;
pub mod tabs;

use crate::models::{
    ActionType, AttendanceRecord, Availability, DailyReport, HomeTab, PreviousDayReport, Worksite,
};
use chrono::NaiveDate;
use forms::{PreviousDayForm, ReportForm, ShiftForm};
use sequencer::{ActionStatus, derive_action_statuses};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

/// "Submitting" flag of one dashboard section.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claims the flag. `None` while another submission holds it.
    pub fn begin(&self) -> Option<InFlightGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(self.0.clone()))
    }
}

/// Clears the flag when dropped, whatever the outcome of the call.
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct AttendanceState {
    pub record: Option<AttendanceRecord>,
    pub latest_previous_day: Option<PreviousDayReport>,
    pub previous_day_done: bool,
    pub daily_report_done: bool,
    /// Stage whose inline form is open.
    pub active_action: Option<ActionType>,
    pub previous_day_form: PreviousDayForm,
    pub submitting: InFlight,
    /// Held while today's record is being fetched.
    pub loading: Arc<Mutex<()>>,
}

impl AttendanceState {
    pub fn statuses(&self) -> Vec<ActionStatus> {
        derive_action_statuses(
            self.record.as_ref(),
            self.previous_day_done,
            self.daily_report_done,
        )
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }
}

#[derive(Debug, Default)]
pub struct ShiftsState {
    pub loaded: bool,
    pub worksites: Vec<Worksite>,
    pub availabilities: Vec<Availability>,
    pub form: ShiftForm,
    pub submitting: InFlight,
}

impl ShiftsState {
    pub fn worksite(&self, worksite_id: &str) -> Option<&Worksite> {
        self.worksites.iter().find(|w| w.id == worksite_id)
    }
}

#[derive(Debug, Default)]
pub struct ReportsState {
    pub loaded: bool,
    pub reports: Vec<DailyReport>,
    pub form: ReportForm,
    pub submitting: InFlight,
}

/// Everything one signed-in user sees. Each tab keeps its own buffers, so
/// moving between tabs never loses what was typed.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub active_tab: HomeTab,
    pub attendance: AttendanceState,
    pub shifts: ShiftsState,
    pub reports: ReportsState,
}

impl Dashboard {
    /// Today's record has to be fetched: none is held yet, or the one held
    /// belongs to an earlier day.
    pub fn needs_load(&self, today: NaiveDate) -> bool {
        match &self.attendance.record {
            Some(record) => record.date != today,
            None => true,
        }
    }

    pub fn switch_tab(&mut self, tab: HomeTab) {
        self.active_tab = tab;
    }

    pub fn open_report_form(&mut self) {
        self.active_tab = HomeTab::Reports;
        self.reports.form.visible = true;
    }
}

/// Dashboards keyed by Discord user id.
#[derive(Debug, Default)]
pub struct DashboardStore {
    dashboards: RwLock<HashMap<String, Arc<Mutex<Dashboard>>>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, discord_id: &str) -> Arc<Mutex<Dashboard>> {
        if let Some(dashboard) = self.dashboards.read().await.get(discord_id) {
            return dashboard.clone();
        }

        self.dashboards
            .write()
            .await
            .entry(discord_id.to_string())
            .or_default()
            .clone()
    }

    /// Forgets everything held for a user, e.g. after logout.
    pub async fn remove(&self, discord_id: &str) {
        self.dashboards.write().await.remove(discord_id);
    }
}
