use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SubsecRound, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("JST offset is within one day")
}

pub fn get_current_date_jst() -> NaiveDate {
    date_jst(Utc::now())
}

/// Calendar day in Japan at the given instant.
pub fn date_jst(datetime: DateTime<Utc>) -> NaiveDate {
    datetime.with_timezone(&jst()).date_naive()
}

/// Capture time for a stage report. Stage timestamps carry second precision.
pub fn capture_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn parse_time_string(time_str: &str) -> Result<NaiveTime> {
    let time_str = time_str.trim();

    if let Ok(time) = NaiveTime::parse_from_str(time_str, "%H:%M") {
        return Ok(time);
    }

    if let Ok(time) = NaiveTime::parse_from_str(time_str, "%H:%M:%S") {
        return Ok(time);
    }

    Err(anyhow::anyhow!("時刻は HH:MM 形式で入力してください"))
}

pub fn parse_date_string(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("日付は YYYY-MM-DD 形式で入力してください"))
}

/// `"07:30"` → `"07:30:00"`. Values that already carry seconds keep them,
/// and single-digit hours are padded.
pub fn normalize_time(time_str: &str) -> Result<String> {
    parse_time_string(time_str).map(|time| time.format("%H:%M:%S").to_string())
}

pub fn format_datetime_jst(datetime: DateTime<Utc>) -> String {
    let jst_time = datetime.with_timezone(&jst());
    jst_time.format("%Y-%m-%d %H:%M:%S JST").to_string()
}

pub fn format_time_jst(datetime: DateTime<Utc>) -> String {
    let jst_time = datetime.with_timezone(&jst());
    jst_time.format("%H:%M").to_string()
}

pub fn format_date_jp(date: NaiveDate) -> String {
    date.format("%Y年%m月%d日").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalizes_minute_precision_times() {
        assert_eq!(normalize_time("07:30").unwrap(), "07:30:00");
        assert_eq!(normalize_time("07:30:00").unwrap(), "07:30:00");
        assert_eq!(normalize_time(" 6:05 ").unwrap(), "06:05:00");
        assert!(normalize_time("6時").is_err());
    }

    #[test]
    fn parses_both_time_shapes() {
        assert_eq!(
            parse_time_string("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time_string("07:30:15").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 15).unwrap()
        );
        assert!(parse_time_string("7時半").is_err());
        assert!(parse_time_string("25:00").is_err());
    }

    #[test]
    fn parses_iso_dates_only() {
        assert_eq!(
            parse_date_string("2025-12-19").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 19).unwrap()
        );
        assert!(parse_date_string("2025/12/19").is_err());
    }

    #[test]
    fn formats_in_japan_time() {
        let utc = Utc.with_ymd_and_hms(2025, 12, 18, 21, 5, 0).unwrap();
        assert_eq!(format_time_jst(utc), "06:05");
        assert_eq!(date_jst(utc), NaiveDate::from_ymd_opt(2025, 12, 19).unwrap());
        assert_eq!(format_datetime_jst(utc), "2025-12-19 06:05:00 JST");
    }

    #[test]
    fn captured_timestamps_drop_subseconds() {
        assert_eq!(capture_timestamp().timestamp_subsec_nanos(), 0);
    }
}
