use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{SeasonId, record::MatchRecord};

/// A named, inclusive date range over the global match log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonWindow {
    pub id: SeasonId,
    pub name: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl SeasonWindow {
    pub fn new(id: SeasonId, name: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            start_date,
            end_date: None,
            is_active: true,
        }
    }

    /// Explicit end, or the last second of the start month.
    pub fn effective_end(&self) -> DateTime<Utc> {
        match self.end_date {
            Some(end) => end,
            None => Self::next_month_start(self.start_date)
                .map(|next| next - TimeDelta::seconds(1))
                .unwrap_or(self.start_date),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_date && instant <= self.effective_end()
    }

    pub fn contains_match(&self, record: &MatchRecord) -> bool {
        self.contains(record.played_at)
    }

    pub fn end(&mut self, end_date: DateTime<Utc>) {
        self.end_date = Some(end_date);
        self.is_active = false;
    }

    /// First instant of the month containing `instant`.
    pub fn month_start(instant: DateTime<Utc>) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(instant.year(), instant.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(instant)
    }

    fn next_month_start(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let (year, month) = if instant.month() == 12 {
            (instant.year() + 1, 1)
        } else {
            (instant.year(), instant.month() + 1)
        };
        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
    }
}
