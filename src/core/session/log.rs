//! Combat narration and the bounded event log.
//!
//! State transitions describe what happened as [`Change`] values; the
//! [`EventLog`] turns them into `HH:MM:SS [R<round>] <message>` lines.

use std::collections::VecDeque;
use std::fmt;

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

/// Maximum number of retained log lines; the oldest is evicted first.
pub const LOG_CAPACITY: usize = 200;

/// Shown in place of an empty combatant name.
pub const UNNAMED: &str = "—";

/// Which resource pool a delta was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pool {
    Hp,
    Mp,
}

impl Pool {
    pub fn label(self) -> &'static str {
        match self {
            Pool::Hp => "HP",
            Pool::Mp => "MP",
        }
    }
}

/// Something worth telling the table about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narration {
    CombatantAdded { name: String, init: i32 },
    CombatantRemoved { name: String },
    CombatantDuplicated { source: String, copy: String },
    TurnChanged { name: String },
    RoundStarted { round: u32 },
    RoundRewound { round: u32 },
    RoundReset,
    ResourceChanged { name: String, pool: Pool, delta: i32, value: i32 },
    ConditionAdded { name: String, condition: String, duration: u32 },
    ConditionChanged { name: String, condition: String, remaining: u32 },
    ConditionExpired { name: String, condition: String },
    ConditionRemoved { name: String, condition: String },
    Sorted,
    Reordered,
    CombatLoaded,
}

impl fmt::Display for Narration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CombatantAdded { name, init } => write!(f, "+ {} (INIT {init})", display_name(name)),
            Self::CombatantRemoved { name } => write!(f, "- {}", display_name(name)),
            Self::CombatantDuplicated { source, copy } => {
                write!(f, "⎘ {} → {}", display_name(source), display_name(copy))
            }
            Self::TurnChanged { name } => write!(f, "Turn: {}", display_name(name)),
            Self::RoundStarted { round } => write!(f, "— Round {round} —"),
            Self::RoundRewound { round } => write!(f, "↩ back (Round {round})"),
            Self::RoundReset => write!(f, "⟳ Round reset to 1"),
            Self::ResourceChanged { name, pool, delta, value } => {
                write!(f, "{}: {} {delta:+} → {value}", display_name(name), pool.label())
            }
            Self::ConditionAdded { name, condition, duration } => {
                write!(f, "{}: + condition \"{condition}\" ({duration}r)", display_name(name))
            }
            Self::ConditionChanged { name, condition, remaining } => {
                write!(f, "{}: {condition} → {remaining}r", display_name(name))
            }
            Self::ConditionExpired { name, condition } => {
                write!(f, "{}: condition \"{condition}\" ended", display_name(name))
            }
            Self::ConditionRemoved { name, condition } => {
                write!(f, "{}: - condition \"{condition}\"", display_name(name))
            }
            Self::Sorted => write!(f, "⇅ Sorted by initiative"),
            Self::Reordered => write!(f, "↕ Manual reorder"),
            Self::CombatLoaded => write!(f, "⬆ Combat loaded"),
        }
    }
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        UNNAMED
    } else {
        name
    }
}

/// A narration paired with the round that was current when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub round: u32,
    pub narration: Narration,
}

impl Change {
    pub fn new(round: u32, narration: Narration) -> Self {
        Self { round, narration }
    }
}

/// Append-only history capped at [`LOG_CAPACITY`] lines.
///
/// Storage order is append order; readers usually want [`EventLog::newest_first`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    entries: VecDeque<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored lines, keeping only the newest [`LOG_CAPACITY`].
    pub fn from_lines(lines: impl IntoIterator<Item = String>) -> Self {
        let mut log = Self::new();
        for line in lines {
            log.push_line(line);
        }
        log
    }

    /// Record one change stamped with the local wall clock.
    pub fn record(&mut self, change: &Change) {
        self.record_at(Local::now().time(), change);
    }

    /// Record one change stamped with `time`.
    pub fn record_at(&mut self, time: NaiveTime, change: &Change) {
        let line = format!("{} [R{}] {}", time.format("%H:%M:%S"), change.round, change.narration);
        tracing::debug!(target: "combat_log", "{line}");
        self.push_line(line);
    }

    pub fn record_all<'a>(&mut self, changes: impl IntoIterator<Item = &'a Change>) {
        let now = Local::now().time();
        for change in changes {
            self.record_at(now, change);
        }
    }

    fn push_line(&mut self, line: String) {
        self.entries.push_back(line);
        while self.entries.len() > LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines in append order (oldest first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.iter().map(String::as_str)
    }

    /// Lines in display order (most recent first).
    pub fn newest_first(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }
}
