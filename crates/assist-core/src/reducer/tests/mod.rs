use chrono::NaiveDate;
use chrono::NaiveTime;

pub(super) use super::reduce;
pub(super) use super::reduce_generated_texts;
pub(super) use super::reduce_habits;
pub(super) use super::reduce_messages;
pub(super) use super::reduce_tasks;
pub(super) use super::AssistEffect;
pub(super) use super::GeneratedTextIntent;
pub(super) use super::HabitIntent;
pub(super) use super::MessageIntent;
pub(super) use super::TaskIntent;
pub(super) use crate::actions::AssistAction;
pub(super) use crate::actions::HabitDraft;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::Stamp;
pub(super) use crate::actions::TaskDraft;
pub(super) use crate::actions::UserAction;
pub(super) use crate::persistence::CollectionKey;
pub(super) use crate::state::AppState;
pub(super) use crate::state::GeneratedText;
pub(super) use crate::state::Habit;
pub(super) use crate::state::Message;
pub(super) use crate::state::Priority;
pub(super) use crate::state::RecordId;
pub(super) use crate::state::Role;
pub(super) use crate::state::Task;

mod habits;

fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date")
}

fn stamp(id: &str, today: &str) -> Stamp {
    Stamp {
        id: RecordId::from(id),
        at_ms: id.parse().unwrap_or(0),
        today: day(today),
    }
}

fn run_user(state: &mut AppState, action: UserAction, stamp: &Stamp) -> Vec<AssistEffect> {
    reduce(state, AssistAction::User(action), stamp)
}

fn run_runtime(state: &mut AppState, action: RuntimeAction, stamp: &Stamp) -> Vec<AssistEffect> {
    reduce(state, AssistAction::Runtime(action), stamp)
}

fn message(id: &str, role: Role, content: &str) -> Message {
    Message {
        id: RecordId::from(id),
        role,
        content: content.to_string(),
        timestamp: 0,
        favorite: false,
    }
}

fn generated(id: &str, prompt: &str) -> GeneratedText {
    GeneratedText {
        id: RecordId::from(id),
        prompt: prompt.to_string(),
        result: format!("result for {prompt}"),
        timestamp: 0,
        favorite: false,
    }
}

fn task(id: &str, title: &str) -> Task {
    Task {
        id: RecordId::from(id),
        title: title.to_string(),
        date: day("2024-03-01"),
        time: NaiveTime::MIN,
        completed: false,
        priority: Priority::Medium,
    }
}

fn habit(id: &str, name: &str) -> Habit {
    Habit::new(RecordId::from(id), name.to_string(), "daily".to_string())
}

fn populated() -> AppState {
    let mut state = AppState::default();
    state.messages = vec![
        message("1", Role::User, "hello"),
        message("2", Role::Assistant, "hi"),
    ];
    state.generated_texts = vec![generated("4", "b"), generated("3", "a")];
    state.tasks = vec![task("5", "Pay rent"), task("6", "Call mom")];
    state.habits = vec![habit("7", "Read"), habit("8", "Run")];
    state
}
