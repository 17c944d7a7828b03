//! Countdown to the Tet target instant.
//!
//! `CountdownEngine::sample` is a pure function of the wall clock: it never
//! stores the previous value, so every sample is recomputed wholesale from
//! `target - now`. The engine has two observable states, `Counting` and
//! `Reached`, and only ever moves from the first to the second.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::Serialize;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Tet Binh Ngo: 2026-02-17 00:00:00 Vietnam time (UTC+7).
pub const DEFAULT_TARGET_RFC3339: &str = "2026-02-17T00:00:00+07:00";

/// Remaining time, split into display units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeLeft {
    fn from_millis(diff_ms: i64) -> Self {
        Self {
            days: (diff_ms / MS_PER_DAY) as u64,
            hours: ((diff_ms / MS_PER_HOUR) % 24) as u8,
            minutes: ((diff_ms / MS_PER_MINUTE) % 60) as u8,
            seconds: ((diff_ms / MS_PER_SECOND) % 60) as u8,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours as u64 * 3_600 + self.minutes as u64 * 60 + self.seconds as u64
    }

    /// The four display cells in page order, with their Vietnamese labels.
    pub fn units(&self) -> [Unit; 4] {
        [
            Unit { key: "days", label: "Ngày", value: self.days },
            Unit { key: "hours", label: "Giờ", value: self.hours as u64 },
            Unit { key: "minutes", label: "Phút", value: self.minutes as u64 },
            Unit { key: "seconds", label: "Giây", value: self.seconds as u64 },
        ]
    }
}

/// One labelled cell of the countdown grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unit {
    pub key: &'static str,
    pub label: &'static str,
    pub value: u64,
}

impl Unit {
    /// Value left-padded to two digits ("07", "42", "123").
    pub fn padded(&self) -> String {
        format!("{:02}", self.value)
    }
}

/// Result of a single sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    Counting(TimeLeft),
    Reached,
}

impl Countdown {
    pub fn time_left(&self) -> Option<TimeLeft> {
        match self {
            Countdown::Counting(left) => Some(*left),
            Countdown::Reached => None,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, Countdown::Reached)
    }

    /// JSON snapshot for JS: the `TimeLeft` object, or `null` once reached.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.time_left())
    }
}

/// Which layout the page should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMode {
    /// Countdown grid over falling petals.
    Countdown,
    /// Greeting over fireworks and confetti.
    Celebration,
}

impl PageMode {
    /// `None` until the driver has taken its first sample, so nothing is
    /// rendered from placeholder data.
    pub fn for_sample(sample: Option<Countdown>) -> Option<Self> {
        sample.map(|s| match s {
            Countdown::Counting(_) => PageMode::Countdown,
            Countdown::Reached => PageMode::Celebration,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageMode::Countdown => "countdown",
            PageMode::Celebration => "celebration",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CountdownEngine {
    target: DateTime<FixedOffset>,
}

impl CountdownEngine {
    pub fn new(target: DateTime<FixedOffset>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> DateTime<FixedOffset> {
        self.target
    }

    pub fn sample<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Countdown {
        self.sample_millis(now.timestamp_millis())
    }

    /// Sample against epoch milliseconds (what `Date.now()` hands out).
    pub fn sample_millis(&self, now_ms: i64) -> Countdown {
        let diff = self.target.timestamp_millis().saturating_sub(now_ms);
        if diff <= 0 {
            Countdown::Reached
        } else {
            Countdown::Counting(TimeLeft::from_millis(diff))
        }
    }
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new(default_target())
    }
}

pub fn default_target() -> DateTime<FixedOffset> {
    // Literal is checked by `default_target_parses` below.
    DateTime::parse_from_rfc3339(DEFAULT_TARGET_RFC3339).unwrap_or_else(|_| {
        FixedOffset::east_opt(7 * 3_600)
            .and_then(|tz| tz.with_ymd_and_hms(2026, 2, 17, 0, 0, 0).single())
            .unwrap_or_default()
    })
}
