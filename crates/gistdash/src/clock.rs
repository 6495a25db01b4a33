//! Pacific-time helpers shared by the jobs.
//!
//! The dashboards are pinned on a profile read in Pacific time; timestamps
//! use a fixed UTC-8 offset (no DST adjustment).

use chrono::{DateTime, FixedOffset, Utc};

/// Fixed Pacific offset (UTC-8).
pub fn pacific() -> FixedOffset {
    FixedOffset::west_opt(8 * 3600).expect("static offset is in range")
}

/// Current time in Pacific.
pub fn pacific_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&pacific())
}

/// Footer timestamp for the money dashboard, e.g. `Jan 05 03:04PM PT`.
pub fn stamp(now: DateTime<FixedOffset>) -> String {
    format!("{} PT", now.format("%b %d %I:%M%p"))
}
