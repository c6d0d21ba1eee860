use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 現場
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worksite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 出社可能日
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub id: String,
    pub date: NaiveDate,
    pub worksite: Worksite,
    #[serde(default)]
    pub notes: Option<String>,
}
