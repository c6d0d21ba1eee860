use serde::{Deserialize, Serialize};

/// 勤怠ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Pending,
    Partial,
    Complete,
    Active,
    Reset,
    Reopened,
    Archived,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Pending => "pending",
            AttendanceStatus::Partial => "partial",
            AttendanceStatus::Complete => "complete",
            AttendanceStatus::Active => "active",
            AttendanceStatus::Reset => "reset",
            AttendanceStatus::Reopened => "reopened",
            AttendanceStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Pending => "未報告",
            AttendanceStatus::Partial => "一部報告",
            AttendanceStatus::Complete => "報告完了",
            AttendanceStatus::Active => "アクティブ",
            AttendanceStatus::Reset => "リセット",
            AttendanceStatus::Reopened => "再開",
            AttendanceStatus::Archived => "アーカイブ",
        }
    }
}

/// 日報ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Archived,
    Superseded,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Submitted => "submitted",
            ReportStatus::Archived => "archived",
            ReportStatus::Superseded => "superseded",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "下書き",
            ReportStatus::Submitted => "提出済み",
            ReportStatus::Archived => "アーカイブ",
            ReportStatus::Superseded => "更新済み",
        }
    }
}

/// ユーザーロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Staff,
    Manager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Staff => "staff",
            UserRole::Manager => "manager",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Staff => "スタッフ",
            UserRole::Manager => "マネージャー",
        }
    }

    /// Cognito group name to role. Anything unknown is treated as staff.
    pub fn from_group(group: Option<&str>) -> Self {
        match group {
            Some("manager") => UserRole::Manager,
            _ => UserRole::Staff,
        }
    }
}

/// 勤怠アクション（前日報告→起床→出発→到着→日報）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    PreviousDay,
    WakeUp,
    Departure,
    Arrival,
    Report,
}

impl ActionType {
    /// Fixed stage order used by the sequencer.
    pub const ALL: [ActionType; 5] = [
        ActionType::PreviousDay,
        ActionType::WakeUp,
        ActionType::Departure,
        ActionType::Arrival,
        ActionType::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::PreviousDay => "previous-day",
            ActionType::WakeUp => "wakeup",
            ActionType::Departure => "departure",
            ActionType::Arrival => "arrival",
            ActionType::Report => "report",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionType::PreviousDay => "前日報告",
            ActionType::WakeUp => "起床報告",
            ActionType::Departure => "出発報告",
            ActionType::Arrival => "到着報告",
            ActionType::Report => "日報作成",
        }
    }

    pub fn active_label(&self) -> &'static str {
        match self {
            ActionType::PreviousDay => "前日報告を入力",
            ActionType::WakeUp => "起床報告を送信",
            ActionType::Departure => "出発報告を送信",
            ActionType::Arrival => "到着報告を送信",
            ActionType::Report => "日報を作成",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionType::PreviousDay => "翌日の予定時刻と準備状況を報告",
            ActionType::WakeUp => "起床時刻を報告",
            ActionType::Departure => "自宅を出発した時刻を報告",
            ActionType::Arrival => "現場に到着した時刻を報告",
            ActionType::Report => "本日の業務内容を報告",
        }
    }

    /// Stages that stamp a time onto the attendance record.
    pub fn is_timestamped(&self) -> bool {
        matches!(
            self,
            ActionType::WakeUp | ActionType::Departure | ActionType::Arrival
        )
    }
}

/// ダッシュボードのタブ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeTab {
    #[default]
    Attendance,
    Shifts,
    Reports,
}

impl HomeTab {
    pub const ALL: [HomeTab; 3] = [HomeTab::Attendance, HomeTab::Shifts, HomeTab::Reports];

    pub fn as_str(&self) -> &'static str {
        match self {
            HomeTab::Attendance => "attendance",
            HomeTab::Shifts => "shifts",
            HomeTab::Reports => "reports",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HomeTab::Attendance => "勤怠報告",
            HomeTab::Shifts => "出社可能日",
            HomeTab::Reports => "日報",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_use_snake_case_wire_keys() {
        let json = serde_json::to_string(&AttendanceStatus::Reopened).unwrap();
        assert_eq!(json, "\"reopened\"");
        let status: ReportStatus = serde_json::from_str("\"superseded\"").unwrap();
        assert_eq!(status, ReportStatus::Superseded);
        assert_eq!(status.as_str(), "superseded");
    }

    #[test]
    fn unknown_group_falls_back_to_staff() {
        assert_eq!(UserRole::from_group(Some("manager")), UserRole::Manager);
        assert_eq!(UserRole::from_group(Some("admins")), UserRole::Staff);
        assert_eq!(UserRole::from_group(None), UserRole::Staff);
    }

    #[test]
    fn action_and_tab_keys_parse_back() {
        for action in ActionType::ALL {
            assert_eq!(ActionType::parse(action.as_str()), Some(action));
        }
        for tab in HomeTab::ALL {
            assert_eq!(HomeTab::parse(tab.as_str()), Some(tab));
        }
        assert_eq!(ActionType::parse("lunch"), None);
    }
}
