//! Raw input buffers for the three dashboard forms.
//!
//! Buffers hold whatever the user typed; nothing is checked until submit,
//! when `validate` turns a buffer into input the orchestrators can send.

use crate::api::payloads::{AvailabilityCreate, PhotoAttachment, PreviousDayReportUpdate};
use crate::models::Worksite;
use crate::utils::time::normalize_time;
use crate::utils::validation::{
    validate_date_format, validate_date_not_past, validate_required,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;

fn required_time(value: &str, field_label: &str) -> Result<String> {
    validate_required(value, field_label)?;
    normalize_time(value).map_err(|e| anyhow!("{}: {}", field_label, e))
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// 前日報告フォーム
#[derive(Debug, Clone, Default)]
pub struct PreviousDayForm {
    pub next_wake_up_time: String,
    pub next_departure_time: String,
    pub next_arrival_time: String,
    pub notes: String,
    pub appearance_photo: Option<PhotoAttachment>,
    pub route_photo: Option<PhotoAttachment>,
}

/// Previous-day input that passed validation. Times carry seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPreviousDay {
    pub next_wake_up_time: String,
    pub next_departure_time: String,
    pub next_arrival_time: String,
    pub notes: Option<String>,
    pub appearance_photo: PhotoAttachment,
    pub route_photo: PhotoAttachment,
}

impl PreviousDayForm {
    pub fn validate(&self) -> Result<ValidPreviousDay> {
        let next_wake_up_time = required_time(&self.next_wake_up_time, "起床予定時刻")?;
        let next_departure_time = required_time(&self.next_departure_time, "出発予定時刻")?;
        let next_arrival_time = required_time(&self.next_arrival_time, "到着予定時刻")?;

        let appearance_photo = self
            .appearance_photo
            .clone()
            .ok_or_else(|| anyhow!("身だしなみ写真を添付してください"))?;
        let route_photo = self
            .route_photo
            .clone()
            .ok_or_else(|| anyhow!("経路写真を添付してください"))?;

        Ok(ValidPreviousDay {
            next_wake_up_time,
            next_departure_time,
            next_arrival_time,
            notes: optional_text(&self.notes),
            appearance_photo,
            route_photo,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Changes to an already submitted previous-day report. Blank fields are
/// left as they are.
#[derive(Debug, Clone, Default)]
pub struct PreviousDayEditForm {
    pub next_wake_up_time: String,
    pub next_departure_time: String,
    pub next_arrival_time: String,
    pub notes: String,
}

impl PreviousDayEditForm {
    pub fn validate(&self) -> Result<PreviousDayReportUpdate> {
        let time = |value: &str, label: &str| -> Result<Option<String>> {
            if value.trim().is_empty() {
                return Ok(None);
            }
            required_time(value, label).map(Some)
        };

        let update = PreviousDayReportUpdate {
            next_wake_up_time: time(&self.next_wake_up_time, "起床予定時刻")?,
            next_departure_time: time(&self.next_departure_time, "出発予定時刻")?,
            next_arrival_time: time(&self.next_arrival_time, "到着予定時刻")?,
            notes: optional_text(&self.notes),
        };
        if update.is_empty() {
            return Err(anyhow!("変更する項目を入力してください"));
        }
        Ok(update)
    }
}

/// 出社可能日登録フォーム
#[derive(Debug, Clone, Default)]
pub struct ShiftForm {
    pub visible: bool,
    pub selected_date: String,
    pub selected_worksite: Option<String>,
    pub notes: String,
}

impl ShiftForm {
    pub fn validate(&self, worksites: &[Worksite], today: NaiveDate) -> Result<AvailabilityCreate> {
        validate_required(&self.selected_date, "日付")?;
        let date = validate_date_format(&self.selected_date)?;
        validate_date_not_past(date, today)?;

        let worksite_id = self
            .selected_worksite
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow!("現場を選択してください"))?;
        if !worksites.iter().any(|w| w.id == worksite_id) {
            return Err(anyhow!("選択された現場が見つかりません"));
        }

        Ok(AvailabilityCreate {
            date,
            worksite_id: worksite_id.to_string(),
            notes: optional_text(&self.notes),
        })
    }

    pub fn clear(&mut self) {
        self.selected_date.clear();
        self.selected_worksite = None;
        self.notes.clear();
    }

    pub fn cancel(&mut self) {
        self.clear();
        self.visible = false;
    }
}

/// 日報作成フォーム
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub visible: bool,
    pub content: String,
}

impl ReportForm {
    pub fn validate(&self) -> Result<String> {
        validate_required(&self.content, "日報内容")?;
        Ok(self.content.trim().to_string())
    }

    pub fn clear(&mut self) {
        self.content.clear();
    }

    pub fn cancel(&mut self) {
        self.clear();
        self.visible = false;
    }
}
