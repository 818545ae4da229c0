//! Habit streak engine.
//!
//! A completion credits at most one calendar day. Completing on the day after
//! `last_completed` extends the run; any other day restarts it at 1. Recorded
//! days are never removed.

use chrono::NaiveDate;

use super::state::Habit;

/// Whether `habit` already has `day` recorded.
pub fn completed_on(habit: &Habit, day: NaiveDate) -> bool {
    habit.completed_dates.contains(&day)
}

pub fn complete(mut habit: Habit, today: NaiveDate) -> Habit {
    if completed_on(&habit, today) {
        return habit;
    }

    let continues_run = habit.last_completed.is_some() && habit.last_completed == today.pred_opt();
    habit.streak = if continues_run {
        habit.streak.saturating_add(1)
    } else {
        1
    };
    habit.completed_dates.insert(today);
    habit.last_completed = Some(today);
    habit
}
