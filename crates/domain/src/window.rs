use crate::errors::DomainError;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// 作成日による絞り込み区間 `[start, end)`
///
/// 暦日 (UTC) の 00:00:00 から翌日 00:00:00 までの半開区間。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CreationWindow {
    /// `YYYY-MM-DD` 形式の日付から区間を作成
    pub fn for_date(date: &str) -> Result<Self, DomainError> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DomainError::InvalidDate(format!("{date}: {e}")))?;
        Self::for_day(day)
            .ok_or_else(|| DomainError::InvalidDate(format!("{date}: out of range")))
    }

    /// 翌日が表現できない日付（`NaiveDate::MAX`）では `None`
    pub fn for_day(day: NaiveDate) -> Option<Self> {
        let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start.checked_add_signed(Duration::days(1))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}
