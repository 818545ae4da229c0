//! Intent dispatch: validate, stamp, reduce, commit.
//!
//! Every accepted intent is reduced and each collection it touched is saved
//! before `dispatch` returns. Gateway requests are handed back to the caller,
//! which answers them later through [`Session::resolve`].
//!
//! A collection that could not be loaded is never saved for the rest of the
//! session, so the stored document survives until someone repairs it.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;

use super::actions::AssistAction;
use super::actions::RuntimeAction;
use super::actions::Stamp;
use super::actions::UserAction;
use super::calendar::Clock;
use super::calendar::ZonePolicy;
use super::error::StoreError;
use super::error::StoreResult;
use super::error::UnreadableSnafu;
use super::persistence::CollectionKey;
use super::persistence::DurableStore;
use super::persistence::StorageMedium;
use super::reducer::reduce;
use super::reducer::AssistEffect;
use super::state::AppState;
use super::state::Habit;
use super::state::LogBuffer;
use super::state::LogLevel;
use super::state::RecordId;
use super::streak;

#[derive(Debug)]
pub struct PersistFailure {
    pub key: CollectionKey,
    pub error: StoreError,
}

#[derive(Debug, Default)]
pub struct Applied {
    /// `RequestChat` / `RequestGeneration` effects for the caller to run.
    pub requests: Vec<AssistEffect>,
    pub persist_failures: Vec<PersistFailure>,
}

#[derive(Debug)]
pub enum DispatchOutcome {
    /// Missing required input; nothing happened.
    Rejected,
    Applied(Applied),
}

impl DispatchOutcome {
    pub fn requests(&self) -> &[AssistEffect] {
        match self {
            Self::Rejected => &[],
            Self::Applied(applied) => &applied.requests,
        }
    }

    pub fn persist_failures(&self) -> &[PersistFailure] {
        match self {
            Self::Rejected => &[],
            Self::Applied(applied) => &applied.persist_failures,
        }
    }
}

pub struct Session<M, C> {
    state: AppState,
    store: DurableStore<M>,
    clock: C,
    zone: ZonePolicy,
    last_id_ms: i64,
    unreadable: BTreeSet<CollectionKey>,
}

impl<M: StorageMedium, C: Clock> Session<M, C> {
    /// Loads all four collections. A collection that fails to load starts
    /// empty, the failure is kept as a notice and the key is write-protected.
    pub fn open(store: DurableStore<M>, clock: C, zone: ZonePolicy) -> Self {
        let now_ms = clock.now().timestamp_millis();
        let mut state = AppState::default();
        let mut unreadable = BTreeSet::new();
        let notices = &mut state.notices;
        state.messages = load_or_empty(&store, CollectionKey::Messages, notices, &mut unreadable, now_ms);
        state.generated_texts =
            load_or_empty(&store, CollectionKey::GeneratedTexts, notices, &mut unreadable, now_ms);
        state.tasks = load_or_empty(&store, CollectionKey::Tasks, notices, &mut unreadable, now_ms);
        state.habits = load_or_empty(&store, CollectionKey::Habits, notices, &mut unreadable, now_ms);

        let last_id_ms = state.max_record_millis().unwrap_or(0);
        tracing::debug!(
            messages = state.messages.len(),
            texts = state.generated_texts.len(),
            tasks = state.tasks.len(),
            habits = state.habits.len(),
            zone = zone.label(),
            "session opened"
        );
        Self {
            state,
            store,
            clock,
            zone,
            last_id_ms,
            unreadable,
        }
    }

    /// Collections that failed to load and will not be saved.
    pub fn unreadable(&self) -> &BTreeSet<CollectionKey> {
        &self.unreadable
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn notices(&self) -> &LogBuffer {
        &self.state.notices
    }

    pub fn store(&self) -> &DurableStore<M> {
        &self.store
    }

    pub fn into_store(self) -> DurableStore<M> {
        self.store
    }

    pub fn zone(&self) -> ZonePolicy {
        self.zone
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.zone.date_of(self.clock.now())
    }

    pub fn completed_today(&self, habit: &Habit) -> bool {
        streak::completed_on(habit, self.today())
    }

    pub fn dispatch(&mut self, action: UserAction) -> DispatchOutcome {
        if !action.is_admissible() {
            return DispatchOutcome::Rejected;
        }
        self.apply(AssistAction::User(action))
    }

    /// Feeds a gateway answer back in as an ordinary add.
    pub fn resolve(&mut self, action: RuntimeAction) -> DispatchOutcome {
        self.apply(AssistAction::Runtime(action))
    }

    fn apply(&mut self, action: AssistAction) -> DispatchOutcome {
        let stamp = self.next_stamp();
        let effects = reduce(&mut self.state, action, &stamp);

        let mut applied = Applied::default();
        for effect in effects {
            match effect {
                AssistEffect::Commit(key) => {
                    if let Err(error) = self.commit(key) {
                        tracing::warn!(collection = key.label(), %error, "failed to persist collection");
                        self.state.notices.append(
                            LogLevel::Warn,
                            stamp.at_ms,
                            format!("could not save {}: {error}", key.label()),
                        );
                        applied.persist_failures.push(PersistFailure { key, error });
                    }
                }
                request => applied.requests.push(request),
            }
        }
        DispatchOutcome::Applied(applied)
    }

    fn commit(&self, key: CollectionKey) -> StoreResult<()> {
        if self.unreadable.contains(&key) {
            return UnreadableSnafu {
                key: key.storage_key(),
            }
            .fail();
        }
        tracing::debug!(collection = key.label(), "committing collection");
        match key {
            CollectionKey::Messages => self.store.save(key, &self.state.messages),
            CollectionKey::GeneratedTexts => self.store.save(key, &self.state.generated_texts),
            CollectionKey::Tasks => self.store.save(key, &self.state.tasks),
            CollectionKey::Habits => self.store.save(key, &self.state.habits),
        }
    }

    /// Ids are creation milliseconds, bumped to stay strictly increasing.
    fn next_stamp(&mut self) -> Stamp {
        let now = self.clock.now();
        let at_ms = now.timestamp_millis();
        let id_ms = match self.last_id_ms.checked_add(1) {
            Some(next) => at_ms.max(next),
            None => at_ms,
        };
        self.last_id_ms = id_ms;
        Stamp {
            id: RecordId::new(id_ms.to_string()),
            at_ms,
            today: self.zone.date_of(now),
        }
    }
}

fn load_or_empty<M: StorageMedium, T: DeserializeOwned>(
    store: &DurableStore<M>,
    key: CollectionKey,
    notices: &mut LogBuffer,
    unreadable: &mut BTreeSet<CollectionKey>,
    now_ms: i64,
) -> Vec<T> {
    match store.load(key) {
        Ok(items) => items,
        Err(error) => {
            tracing::warn!(collection = key.label(), %error, "failed to load collection, starting empty");
            notices.append(
                LogLevel::Warn,
                now_ms,
                format!(
                    "could not load {}: {error}; changes to it will not be saved",
                    key.label()
                ),
            );
            unreadable.insert(key);
            Vec::new()
        }
    }
}
