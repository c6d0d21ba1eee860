use crate::utils::time::parse_date_string;
use anyhow::Result;
use chrono::NaiveDate;

pub fn validate_date_format(date_str: &str) -> Result<NaiveDate> {
    parse_date_string(date_str)
}

pub fn validate_required(value: &str, field_label: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow::anyhow!("{}を入力してください", field_label));
    }
    Ok(())
}

pub fn validate_date_not_past(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date < today {
        return Err(anyhow::anyhow!("過去の日付は登録できません"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(validate_required("  ", "日報内容").is_err());
        assert!(validate_required("配線工事", "日報内容").is_ok());
    }

    #[test]
    fn past_dates_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 18).unwrap();
        assert!(validate_date_not_past(today, today).is_ok());
        assert!(validate_date_not_past(today.pred_opt().unwrap(), today).is_err());
    }
}
