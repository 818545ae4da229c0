use chrono::NaiveDate;
use chrono::NaiveTime;

use super::state::clock_time;
use super::state::Priority;
use super::state::RecordId;

#[derive(Debug, Clone)]
pub enum AssistAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    SendChat { content: String },
    ToggleMessageFavorite { id: RecordId },
    DeleteMessage { id: RecordId },
    RequestGeneration { prompt: String },
    ToggleTextFavorite { id: RecordId },
    DeleteText { id: RecordId },
    AddTask(TaskDraft),
    ToggleTaskComplete { id: RecordId },
    DeleteTask { id: RecordId },
    AddHabit(HabitDraft),
    CompleteHabit { id: RecordId },
    DeleteHabit { id: RecordId },
}

/// Follow-ups produced when a gateway request comes back.
#[derive(Debug, Clone)]
pub enum RuntimeAction {
    ChatAnswered { reply: String },
    GenerationFinished { prompt: String, result: String },
}

/// Raw task form input, validated at dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub date: String,
    pub time: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedTask {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub priority: Priority,
}

impl TaskDraft {
    /// `None` when the title is blank, the date is missing or unparseable,
    /// or a non-empty time is unparseable. An empty time means midnight.
    pub fn accept(&self) -> Option<AcceptedTask> {
        if self.title.trim().is_empty() {
            return None;
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let time = if self.time.trim().is_empty() {
            NaiveTime::MIN
        } else {
            clock_time::parse(&self.time)?
        };
        Some(AcceptedTask {
            title: self.title.clone(),
            date,
            time,
            priority: self.priority,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub goal: String,
}

impl HabitDraft {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.goal.trim().is_empty()
    }
}

impl UserAction {
    /// Add intents with missing required input are never dispatched.
    pub fn is_admissible(&self) -> bool {
        match self {
            Self::SendChat { content } => !content.trim().is_empty(),
            Self::RequestGeneration { prompt } => !prompt.trim().is_empty(),
            Self::AddTask(draft) => draft.accept().is_some(),
            Self::AddHabit(draft) => draft.is_complete(),
            _ => true,
        }
    }
}

/// Identity and time assigned to one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub id: RecordId,
    pub at_ms: i64,
    pub today: NaiveDate,
}
