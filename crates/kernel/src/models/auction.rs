//! Auction countdown computation.

use chrono::{DateTime, Utc};
use serde::Serialize;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Whole-unit breakdown of the time left before an auction closes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    /// Time left from `now` until `ends_at`, or `None` once the end has been
    /// reached.
    pub fn until(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let secs = (ends_at - now).num_seconds();
        if secs <= 0 {
            return None;
        }
        Some(Self {
            days: secs / SECS_PER_DAY,
            hours: (secs % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (secs % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: secs % SECS_PER_MINUTE,
        })
    }

    /// Short label for listing cards: `2d 3h`, `3h 5m`, or `5m`.
    pub fn compact_label(&self) -> String {
        if self.days > 0 {
            format!("{}d {}h", self.days, self.hours)
        } else if self.hours > 0 {
            format!("{}h {}m", self.hours, self.minutes)
        } else {
            format!("{}m", self.minutes)
        }
    }

    /// Label for detail pages: `2d 3h`, `3h 5m 10s`, or `5m 10s`.
    ///
    /// Seconds are only shown on the last day.
    pub fn detailed_label(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if self.days > 0 {
            parts.push(format!("{}d", self.days));
        }
        if self.hours > 0 || self.days > 0 {
            parts.push(format!("{}h", self.hours));
        }
        if self.days == 0 {
            parts.push(format!("{}m", self.minutes));
            parts.push(format!("{}s", self.seconds));
        }
        parts.join(" ")
    }
}

/// Auction state of a listing at a given instant.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuctionStatus {
    /// Fixed-price listing; no countdown.
    NotAuction,
    /// Auction with no end time recorded.
    Unscheduled,
    Open {
        ends_at: DateTime<Utc>,
        remaining: TimeRemaining,
    },
    Ended {
        ends_at: DateTime<Utc>,
    },
}
