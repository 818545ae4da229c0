use chrono::NaiveDate;

use super::actions::AssistAction;
use super::actions::RuntimeAction;
use super::actions::Stamp;
use super::actions::UserAction;
use super::persistence::CollectionKey;
use super::state::AppState;
use super::state::GeneratedText;
use super::state::Habit;
use super::state::Message;
use super::state::RecordId;
use super::state::Role;
use super::state::Task;
use super::streak;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistEffect {
    /// Persist the whole collection now.
    Commit(CollectionKey),
    RequestChat { message: String },
    RequestGeneration { prompt: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageIntent {
    Add(Message),
    ToggleFavorite(RecordId),
    Delete(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedTextIntent {
    Add(GeneratedText),
    ToggleFavorite(RecordId),
    Delete(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIntent {
    Add(Task),
    ToggleComplete(RecordId),
    Delete(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitIntent {
    Add(Habit),
    Complete { id: RecordId, today: NaiveDate },
    Delete(RecordId),
}

pub fn reduce_messages(mut messages: Vec<Message>, intent: MessageIntent) -> Vec<Message> {
    match intent {
        MessageIntent::Add(message) => messages.push(message),
        MessageIntent::ToggleFavorite(id) => {
            if let Some(message) = messages.iter_mut().find(|m| m.id == id) {
                message.favorite = !message.favorite;
            }
        }
        MessageIntent::Delete(id) => messages.retain(|m| m.id != id),
    }
    messages
}

/// Newest generations go first.
pub fn reduce_generated_texts(
    mut texts: Vec<GeneratedText>,
    intent: GeneratedTextIntent,
) -> Vec<GeneratedText> {
    match intent {
        GeneratedTextIntent::Add(text) => texts.insert(0, text),
        GeneratedTextIntent::ToggleFavorite(id) => {
            if let Some(text) = texts.iter_mut().find(|t| t.id == id) {
                text.favorite = !text.favorite;
            }
        }
        GeneratedTextIntent::Delete(id) => texts.retain(|t| t.id != id),
    }
    texts
}

pub fn reduce_tasks(mut tasks: Vec<Task>, intent: TaskIntent) -> Vec<Task> {
    match intent {
        TaskIntent::Add(task) => tasks.push(task),
        TaskIntent::ToggleComplete(id) => {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                task.completed = !task.completed;
            }
        }
        TaskIntent::Delete(id) => tasks.retain(|t| t.id != id),
    }
    tasks
}

pub fn reduce_habits(habits: Vec<Habit>, intent: HabitIntent) -> Vec<Habit> {
    match intent {
        HabitIntent::Add(habit) => {
            let mut habits = habits;
            habits.push(habit);
            habits
        }
        HabitIntent::Complete { id, today } => habits
            .into_iter()
            .map(|habit| {
                if habit.id == id {
                    streak::complete(habit, today)
                } else {
                    habit
                }
            })
            .collect(),
        HabitIntent::Delete(id) => {
            let mut habits = habits;
            habits.retain(|h| h.id != id);
            habits
        }
    }
}

pub fn reduce(state: &mut AppState, action: AssistAction, stamp: &Stamp) -> Vec<AssistEffect> {
    match action {
        AssistAction::User(user) => reduce_user(state, user, stamp),
        AssistAction::Runtime(runtime) => reduce_runtime(state, runtime, stamp),
    }
}

fn reduce_user(state: &mut AppState, action: UserAction, stamp: &Stamp) -> Vec<AssistEffect> {
    match action {
        UserAction::SendChat { content } => {
            if content.trim().is_empty() {
                return Vec::new();
            }
            let message = Message {
                id: stamp.id.clone(),
                role: Role::User,
                content: content.clone(),
                timestamp: stamp.at_ms,
                favorite: false,
            };
            apply_messages(state, MessageIntent::Add(message));
            state.pending.chat = true;
            vec![
                AssistEffect::Commit(CollectionKey::Messages),
                AssistEffect::RequestChat { message: content },
            ]
        }
        UserAction::ToggleMessageFavorite { id } => {
            apply_messages(state, MessageIntent::ToggleFavorite(id));
            vec![AssistEffect::Commit(CollectionKey::Messages)]
        }
        UserAction::DeleteMessage { id } => {
            apply_messages(state, MessageIntent::Delete(id));
            vec![AssistEffect::Commit(CollectionKey::Messages)]
        }
        UserAction::RequestGeneration { prompt } => {
            if prompt.trim().is_empty() {
                return Vec::new();
            }
            state.pending.generation = true;
            vec![AssistEffect::RequestGeneration { prompt }]
        }
        UserAction::ToggleTextFavorite { id } => {
            apply_texts(state, GeneratedTextIntent::ToggleFavorite(id));
            vec![AssistEffect::Commit(CollectionKey::GeneratedTexts)]
        }
        UserAction::DeleteText { id } => {
            apply_texts(state, GeneratedTextIntent::Delete(id));
            vec![AssistEffect::Commit(CollectionKey::GeneratedTexts)]
        }
        UserAction::AddTask(draft) => {
            let Some(accepted) = draft.accept() else {
                return Vec::new();
            };
            let task = Task {
                id: stamp.id.clone(),
                title: accepted.title,
                date: accepted.date,
                time: accepted.time,
                completed: false,
                priority: accepted.priority,
            };
            apply_tasks(state, TaskIntent::Add(task));
            vec![AssistEffect::Commit(CollectionKey::Tasks)]
        }
        UserAction::ToggleTaskComplete { id } => {
            apply_tasks(state, TaskIntent::ToggleComplete(id));
            vec![AssistEffect::Commit(CollectionKey::Tasks)]
        }
        UserAction::DeleteTask { id } => {
            apply_tasks(state, TaskIntent::Delete(id));
            vec![AssistEffect::Commit(CollectionKey::Tasks)]
        }
        UserAction::AddHabit(draft) => {
            if !draft.is_complete() {
                return Vec::new();
            }
            let habit = Habit::new(stamp.id.clone(), draft.name, draft.goal);
            apply_habits(state, HabitIntent::Add(habit));
            vec![AssistEffect::Commit(CollectionKey::Habits)]
        }
        UserAction::CompleteHabit { id } => {
            apply_habits(
                state,
                HabitIntent::Complete {
                    id,
                    today: stamp.today,
                },
            );
            vec![AssistEffect::Commit(CollectionKey::Habits)]
        }
        UserAction::DeleteHabit { id } => {
            apply_habits(state, HabitIntent::Delete(id));
            vec![AssistEffect::Commit(CollectionKey::Habits)]
        }
    }
}

fn reduce_runtime(state: &mut AppState, action: RuntimeAction, stamp: &Stamp) -> Vec<AssistEffect> {
    match action {
        RuntimeAction::ChatAnswered { reply } => {
            let message = Message {
                id: stamp.id.clone(),
                role: Role::Assistant,
                content: reply,
                timestamp: stamp.at_ms,
                favorite: false,
            };
            apply_messages(state, MessageIntent::Add(message));
            state.pending.chat = false;
            vec![AssistEffect::Commit(CollectionKey::Messages)]
        }
        RuntimeAction::GenerationFinished { prompt, result } => {
            let text = GeneratedText {
                id: stamp.id.clone(),
                prompt,
                result,
                timestamp: stamp.at_ms,
                favorite: false,
            };
            apply_texts(state, GeneratedTextIntent::Add(text));
            state.pending.generation = false;
            vec![AssistEffect::Commit(CollectionKey::GeneratedTexts)]
        }
    }
}

fn apply_messages(state: &mut AppState, intent: MessageIntent) {
    state.messages = reduce_messages(std::mem::take(&mut state.messages), intent);
}

fn apply_texts(state: &mut AppState, intent: GeneratedTextIntent) {
    state.generated_texts = reduce_generated_texts(std::mem::take(&mut state.generated_texts), intent);
}

fn apply_tasks(state: &mut AppState, intent: TaskIntent) {
    state.tasks = reduce_tasks(std::mem::take(&mut state.tasks), intent);
}

fn apply_habits(state: &mut AppState, intent: HabitIntent) {
    state.habits = reduce_habits(std::mem::take(&mut state.habits), intent);
}

#[cfg(test)]
mod tests;
