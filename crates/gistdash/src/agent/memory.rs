//! Persona memory persisted as a JSON blob in the data gist.
//!
//! Plain read-modify-write: the job loads the blob at startup, appends the
//! new thought at the end, and writes the whole blob back. A missing or
//! unreadable blob means the persona just woke up.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Filename of the memory blob inside the data gist.
pub const MEMORY_FILENAME: &str = "agent_memory.json";

/// Recent thoughts kept in memory.
pub const MAX_RECENT_THOUGHTS: usize = 30;

/// Discoveries kept in memory.
pub const MAX_DISCOVERIES: usize = 20;

/// A discovery is recorded every this many updates (hourly at the 5-minute
/// update cadence).
pub const DISCOVERY_INTERVAL: u64 = 12;

/// One remembered update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thought {
    pub time: String,
    pub weather: String,
    pub mood: String,
    pub lines: String,
}

/// The persona's whole remembered state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentMemory {
    pub created_at: String,
    pub update_count: u64,
    pub recent_thoughts: Vec<Thought>,
    pub mood: String,
    pub discoveries: Vec<String>,
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self {
            created_at: String::new(),
            update_count: 0,
            recent_thoughts: Vec::new(),
            mood: "newborn".to_string(),
            discoveries: Vec::new(),
        }
    }
}

impl AgentMemory {
    /// Fresh memory for a persona that just woke up.
    pub fn newborn(now: DateTime<FixedOffset>) -> Self {
        Self {
            created_at: now.to_rfc3339(),
            ..Self::default()
        }
    }

    /// Parse the gist blob; `None` if it isn't valid memory JSON.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Age since `created_at`, e.g. `3d 7h` or `2h 15m`.
    ///
    /// An unparseable or future `created_at` yields `0h 0m`.
    pub fn age_string(&self, now: DateTime<FixedOffset>) -> String {
        let created = parse_created_at(&self.created_at, now.timezone());
        let delta = now - created.unwrap_or(now);
        let days = delta.num_days();
        if days > 0 {
            format!("{}d {}h", days, delta.num_hours() % 24)
        } else {
            let hours = delta.num_hours().max(0);
            let minutes = (delta.num_minutes() % 60).max(0);
            format!("{hours}h {minutes}m")
        }
    }

    /// Record one update: bump the counter, append the thought, prune, and
    /// log a discovery every [`DISCOVERY_INTERVAL`] updates.
    pub fn record(&mut self, thought: Thought, mood: &str, now: DateTime<FixedOffset>) {
        self.update_count += 1;
        self.recent_thoughts.push(thought);
        if self.recent_thoughts.len() > MAX_RECENT_THOUGHTS {
            let excess = self.recent_thoughts.len() - MAX_RECENT_THOUGHTS;
            self.recent_thoughts.drain(..excess);
        }
        self.mood = mood.to_string();

        if self.update_count % DISCOVERY_INTERVAL == 0 {
            self.discoveries.push(format!(
                "[{}] mood:{} updates:{}",
                now.format("%m/%d %H:%M"),
                mood,
                self.update_count
            ));
            if self.discoveries.len() > MAX_DISCOVERIES {
                let excess = self.discoveries.len() - MAX_DISCOVERIES;
                self.discoveries.drain(..excess);
            }
        }
    }
}

fn parse_created_at(raw: &str, tz: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }
    // Naive timestamps from older blobs are taken as Pacific.
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    tz.from_local_datetime(&naive).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::pacific;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        pacific().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn newborn_has_no_history() {
        let mem = AgentMemory::newborn(at(2026, 3, 1, 8, 0));
        assert_eq!(mem.update_count, 0);
        assert_eq!(mem.mood, "newborn");
        assert!(mem.recent_thoughts.is_empty());
        assert_eq!(mem.age_string(at(2026, 3, 1, 8, 0)), "0h 0m");
    }

    #[test]
    fn age_under_a_day() {
        let mem = AgentMemory::newborn(at(2026, 3, 1, 8, 0));
        assert_eq!(mem.age_string(at(2026, 3, 1, 10, 15)), "2h 15m");
    }

    #[test]
    fn age_over_a_day() {
        let mem = AgentMemory::newborn(at(2026, 3, 1, 8, 0));
        assert_eq!(mem.age_string(at(2026, 3, 4, 15, 30)), "3d 7h");
    }

    #[test]
    fn age_tolerates_bad_created_at() {
        let mem = AgentMemory {
            created_at: "not a date".to_string(),
            ..AgentMemory::default()
        };
        assert_eq!(mem.age_string(at(2026, 3, 1, 8, 0)), "0h 0m");
    }

    #[test]
    fn age_accepts_naive_timestamp() {
        let mem = AgentMemory {
            created_at: "2026-03-01T08:00:00".to_string(),
            ..AgentMemory::default()
        };
        assert_eq!(mem.age_string(at(2026, 3, 1, 9, 30)), "1h 30m");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(AgentMemory::parse("not json").is_none());
        assert!(AgentMemory::parse("{\"update_count\": 7}").is_some());
    }

    #[test]
    fn parse_fills_missing_fields() {
        let mem = AgentMemory::parse("{\"update_count\": 7}").unwrap();
        assert_eq!(mem.update_count, 7);
        assert_eq!(mem.mood, "newborn");
    }

    fn thought(i: usize) -> Thought {
        Thought {
            time: format!("2026-03-01 08:{i:02}"),
            weather: "58F clear".to_string(),
            mood: "curious".to_string(),
            lines: format!("thought {i}"),
        }
    }

    #[test]
    fn record_prunes_thoughts() {
        let now = at(2026, 3, 1, 8, 0);
        let mut mem = AgentMemory::newborn(now);
        for i in 0..40 {
            mem.record(thought(i), "curious", now);
        }
        assert_eq!(mem.update_count, 40);
        assert_eq!(mem.recent_thoughts.len(), MAX_RECENT_THOUGHTS);
        // Oldest entries dropped, newest kept.
        assert_eq!(mem.recent_thoughts.last().unwrap().lines, "thought 39");
        assert_eq!(mem.recent_thoughts[0].lines, "thought 10");
    }

    #[test]
    fn record_logs_discovery_every_twelfth_update() {
        let now = at(2026, 3, 1, 8, 0);
        let mut mem = AgentMemory::newborn(now);
        for i in 0..24 {
            mem.record(thought(i), "content", now);
        }
        assert_eq!(mem.discoveries.len(), 2);
        assert!(mem.discoveries[0].contains("updates:12"));
        assert!(mem.discoveries[1].contains("updates:24"));
    }

    #[test]
    fn round_trips_through_json() {
        let now = at(2026, 3, 1, 8, 0);
        let mut mem = AgentMemory::newborn(now);
        mem.record(thought(0), "playful", now);
        let raw = serde_json::to_string_pretty(&mem).unwrap();
        assert_eq!(AgentMemory::parse(&raw).unwrap(), mem);
    }
}
