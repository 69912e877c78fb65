//! 时间工具函数 — 营业日边界计算
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! ledger 层只接收 `i64` Unix millis 或 [`DayRange`]。
//!
//! Day-close and the date-filtered read views work on explicit half-open
//! ranges `[start, end)` in the business timezone, never on localized
//! date-string equality.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use shared::error::{AppError, AppResult};

/// Half-open business day range `[start, end)` in Unix millis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: i64,
    pub end: i64,
}

impl DayRange {
    pub fn contains(&self, millis: i64) -> bool {
        self.start <= millis && millis < self.end
    }
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期 + 时分秒 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(hour, min, sec).unwrap();
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_hms_to_millis(next_day, 0, 0, 0, tz)
}

/// Calendar day range for an explicit date (业务时区)
pub fn calendar_day_range(date: NaiveDate, tz: Tz) -> DayRange {
    DayRange {
        start: day_start_millis(date, tz),
        end: day_end_millis(date, tz),
    }
}

/// 日期 + cutoff 时间 → Unix millis (业务时区)
pub fn date_cutoff_millis(date: NaiveDate, cutoff: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(cutoff);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 解析 cutoff 时间字符串 (HH:MM)，失败返回 00:00
pub fn parse_cutoff(cutoff: &str) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse business_day_cutoff '{}': {}, falling back to 00:00",
            cutoff,
            e
        );
        NaiveTime::MIN
    })
}

/// 计算当前营业日起始日期 (业务时区)
///
/// 当前时间 < cutoff → 还在"昨天"的营业日
/// 当前时间 >= cutoff → 当前营业日 = 今天
pub fn current_business_date(cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    let now = chrono::Utc::now().with_timezone(&tz);
    if now.time() < cutoff {
        (now - chrono::Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

/// 当前营业日范围 `[cutoff, 次日 cutoff)` (业务时区)
pub fn current_business_day_range(cutoff: NaiveTime, tz: Tz) -> DayRange {
    let date = current_business_date(cutoff, tz);
    let next = date.succ_opt().unwrap_or(date);
    DayRange {
        start: date_cutoff_millis(date, cutoff, tz),
        end: date_cutoff_millis(next, cutoff, tz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Bogota;

    #[test]
    fn day_range_is_half_open() {
        let date = parse_date("2025-03-10").unwrap();
        let range = calendar_day_range(date, Bogota);
        assert!(range.contains(range.start));
        assert!(!range.contains(range.end));
        // 24h day in a DST-free timezone
        assert_eq!(range.end - range.start, 24 * 3600 * 1000);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("10/03/2025").is_err());
        assert!(parse_date("2025-13-40").is_err());
    }

    #[test]
    fn cutoff_parse_falls_back_to_midnight() {
        assert_eq!(parse_cutoff("02:00"), NaiveTime::from_hms_opt(2, 0, 0).unwrap());
        assert_eq!(parse_cutoff("not a time"), NaiveTime::MIN);
    }
}
