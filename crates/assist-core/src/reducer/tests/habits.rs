use super::*;
use pretty_assertions::assert_eq;

#[test]
fn added_habit_starts_uncompleted() {
    let mut state = AppState::default();
    let effects = run_user(
        &mut state,
        UserAction::AddHabit(HabitDraft {
            name: "Read".to_string(),
            goal: "10 pages".to_string(),
        }),
        &stamp("10", "2024-01-01"),
    );

    let habit = &state.habits[0];
    assert_eq!(habit.streak, 0);
    assert_eq!(habit.last_completed, None);
    assert!(habit.completed_dates.is_empty());
    assert_eq!(effects, vec![AssistEffect::Commit(CollectionKey::Habits)]);
}

#[test]
fn consecutive_completions_build_a_streak() {
    let mut state = populated();
    for (id, today) in [("10", "2024-01-01"), ("11", "2024-01-02"), ("12", "2024-01-03")] {
        run_user(
            &mut state,
            UserAction::CompleteHabit {
                id: RecordId::from("7"),
            },
            &stamp(id, today),
        );
    }

    let read = state.find_habit(&RecordId::from("7")).expect("habit");
    assert_eq!(read.streak, 3);
    assert_eq!(read.completed_dates.len(), 3);
    assert_eq!(read.last_completed, Some(day("2024-01-03")));

    let run = state.find_habit(&RecordId::from("8")).expect("habit");
    assert_eq!(run.streak, 0);
}

#[test]
fn gap_between_completions_resets_streak() {
    let habits = reduce_habits(
        populated().habits,
        HabitIntent::Complete {
            id: RecordId::from("7"),
            today: day("2024-01-01"),
        },
    );
    let habits = reduce_habits(
        habits,
        HabitIntent::Complete {
            id: RecordId::from("7"),
            today: day("2024-01-05"),
        },
    );
    assert_eq!(habits[0].streak, 1);
}

#[test]
fn completing_twice_in_a_day_is_idempotent() {
    let complete = HabitIntent::Complete {
        id: RecordId::from("8"),
        today: day("2024-01-01"),
    };
    let once = reduce_habits(populated().habits, complete.clone());
    let twice = reduce_habits(once.clone(), complete);
    assert_eq!(once, twice);
}

#[test]
fn completing_unknown_habit_changes_nothing() {
    let habits = populated().habits;
    let after = reduce_habits(
        habits.clone(),
        HabitIntent::Complete {
            id: RecordId::from("missing"),
            today: day("2024-01-01"),
        },
    );
    assert_eq!(after, habits);
}
