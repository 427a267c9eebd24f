//! # Editions
//!
//! Three daily publishing editions. Each one owns
//! - a wall-clock slot used to auto-detect "the current edition", and
//! - an eligibility window over `published_at` for the same calendar day.
//!
//! The evening eligibility window closes at 21:59:59, so articles published
//! between 22:00:00 and 23:59:59 belong to no edition of that date.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown edition `{0}` (expected morning, afternoon or evening)")]
pub struct ParseEditionError(pub String);

fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    // Only called with literal, in-range values.
    NaiveTime::from_hms_opt(h, m, s).unwrap_or(NaiveTime::MIN)
}

impl Edition {
    pub const ALL: [Edition; 3] = [Edition::Morning, Edition::Afternoon, Edition::Evening];

    pub fn as_str(self) -> &'static str {
        match self {
            Edition::Morning => "morning",
            Edition::Afternoon => "afternoon",
            Edition::Evening => "evening",
        }
    }

    /// Display label used in run summaries.
    pub fn label(self) -> &'static str {
        match self {
            Edition::Morning => "오전판",
            Edition::Afternoon => "오후판",
            Edition::Evening => "저녁/반판",
        }
    }

    /// Headline title shown for the edition's published list.
    pub fn headline_title(self) -> &'static str {
        match self {
            Edition::Morning => "오늘 오전 뉴스 헤드라인",
            Edition::Afternoon => "오늘 오후 뉴스 헤드라인",
            Edition::Evening => "오늘 밤 뉴스 헤드라인",
        }
    }

    /// Edition for a wall-clock time: `< 07:00` morning, `[07:00, 14:00)` afternoon, else evening.
    pub fn for_time(t: NaiveTime) -> Edition {
        if t < hms(7, 0, 0) {
            Edition::Morning
        } else if t < hms(14, 0, 0) {
            Edition::Afternoon
        } else {
            Edition::Evening
        }
    }

    /// Current edition per the local clock.
    pub fn current() -> Edition {
        Self::for_time(chrono::Local::now().naive_local().time())
    }

    /// Inclusive `(start, end)` times of the article eligibility window.
    pub fn window_times(self) -> (NaiveTime, NaiveTime) {
        match self {
            Edition::Morning => (hms(0, 0, 0), hms(6, 59, 59)),
            Edition::Afternoon => (hms(7, 0, 0), hms(13, 59, 59)),
            Edition::Evening => (hms(14, 0, 0), hms(21, 59, 59)),
        }
    }

    /// Inclusive eligibility window on `date`.
    pub fn eligibility_window(self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let (start, end) = self.window_times();
        (date.and_time(start), date.and_time(end))
    }

    /// True when `published_at` falls inside this edition's window on `date`.
    pub fn accepts(self, date: NaiveDate, published_at: NaiveDateTime) -> bool {
        let (start, end) = self.eligibility_window(date);
        published_at >= start && published_at <= end
    }

    /// The edition whose window (on the article's own date) contains `published_at`, if any.
    pub fn for_published(published_at: NaiveDateTime) -> Option<Edition> {
        let date = published_at.date();
        Self::ALL.into_iter().find(|e| e.accepts(date, published_at))
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edition {
    type Err = ParseEditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Edition::Morning),
            "afternoon" => Ok(Edition::Afternoon),
            "evening" => Ok(Edition::Evening),
            other => Err(ParseEditionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn wall_clock_slots() {
        assert_eq!(Edition::for_time(t(0, 0, 0)), Edition::Morning);
        assert_eq!(Edition::for_time(t(6, 59, 59)), Edition::Morning);
        assert_eq!(Edition::for_time(t(7, 0, 0)), Edition::Afternoon);
        assert_eq!(Edition::for_time(t(13, 59, 59)), Edition::Afternoon);
        assert_eq!(Edition::for_time(t(14, 0, 0)), Edition::Evening);
        assert_eq!(Edition::for_time(t(23, 59, 59)), Edition::Evening);
    }

    #[test]
    fn parse_round_trips_names() {
        for e in Edition::ALL {
            assert_eq!(e.as_str().parse::<Edition>().unwrap(), e);
        }
        assert_eq!(" Evening ".parse::<Edition>().unwrap(), Edition::Evening);
        assert!("night".parse::<Edition>().is_err());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert!(Edition::Afternoon.accepts(d, d.and_time(t(7, 0, 0))));
        assert!(Edition::Afternoon.accepts(d, d.and_time(t(13, 59, 59))));
        assert!(!Edition::Afternoon.accepts(d, d.and_time(t(14, 0, 0))));
    }
}
