use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::fmt;

use chrono::NaiveDate;
use chrono::NaiveTime;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of ids issued by the session, if this id is one.
    pub fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: RecordId,
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedText {
    pub id: RecordId,
    pub prompt: String,
    pub result: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    pub completed: bool,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: RecordId,
    pub name: String,
    pub goal: String,
    pub streak: u32,
    pub last_completed: Option<NaiveDate>,
    pub completed_dates: BTreeSet<NaiveDate>,
}

impl Habit {
    pub fn new(id: RecordId, name: String, goal: String) -> Self {
        Self {
            id,
            name,
            goal,
            streak: 0,
            last_completed: None,
            completed_dates: BTreeSet::new(),
        }
    }
}

/// Task times persist as `HH:MM`.
pub mod clock_time {
    use chrono::NaiveTime;
    use chrono::Timelike;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid clock time '{raw}'")))
    }

    /// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped so the value
    /// survives a save and reload unchanged.
    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        let time = NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()?;
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: i64,
    pub message: String,
}

/// Bounded notice log. Oldest entries are evicted first; `seq` keeps counting.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, level: LogLevel, ts_ms: i64, message: impl Into<String>) {
        let entry = LogEntry {
            seq: self.next_seq,
            level,
            ts_ms,
            message: message.into(),
        };
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(200)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingRequests {
    pub chat: bool,
    pub generation: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub messages: Vec<Message>,
    pub generated_texts: Vec<GeneratedText>,
    pub tasks: Vec<Task>,
    pub habits: Vec<Habit>,
    pub pending: PendingRequests,
    pub notices: LogBuffer,
}

impl AppState {
    pub fn find_habit(&self, id: &RecordId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }

    /// Largest numeric id across all collections that still has a successor.
    pub fn max_record_millis(&self) -> Option<i64> {
        let messages = self.messages.iter().map(|m| &m.id);
        let texts = self.generated_texts.iter().map(|t| &t.id);
        let tasks = self.tasks.iter().map(|t| &t.id);
        let habits = self.habits.iter().map(|h| &h.id);
        messages
            .chain(texts)
            .chain(tasks)
            .chain(habits)
            .filter_map(RecordId::as_millis)
            .filter(|ms| *ms < i64::MAX)
            .max()
    }
}
