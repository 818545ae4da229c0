use std::fmt::Write;

use assist_core::state::GeneratedText;
use assist_core::state::Habit;
use assist_core::state::LogBuffer;
use assist_core::state::LogLevel;
use assist_core::state::Message;
use assist_core::state::Task;
use assist_core::streak;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;

pub fn messages(items: &[Message], favorites_only: bool) -> String {
    let mut out = String::new();
    for message in items.iter().filter(|m| !favorites_only || m.favorite) {
        let _ = writeln!(
            out,
            "{} {} [{}] {}: {}",
            star(message.favorite),
            message.id,
            stamp(message.timestamp),
            message.role.label(),
            message.content
        );
    }
    if out.is_empty() {
        out.push_str(if favorites_only {
            "No favorite messages.\n"
        } else {
            "No messages yet.\n"
        });
    }
    out
}

pub fn texts(items: &[GeneratedText], favorites_only: bool) -> String {
    let mut out = String::new();
    for text in items.iter().filter(|t| !favorites_only || t.favorite) {
        let _ = writeln!(
            out,
            "{} {} [{}] {}",
            star(text.favorite),
            text.id,
            stamp(text.timestamp),
            text.prompt
        );
        for line in text.result.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    if out.is_empty() {
        out.push_str(if favorites_only {
            "No favorite texts.\n"
        } else {
            "No generated texts yet.\n"
        });
    }
    out
}

pub fn tasks(items: &[Task]) -> String {
    if items.is_empty() {
        return "No tasks.\n".to_string();
    }
    let mut out = String::new();
    for task in items {
        let check = if task.completed { "[x]" } else { "[ ]" };
        let when = if task.time == NaiveTime::MIN {
            task.date.to_string()
        } else {
            format!("{} at {}", task.date, task.time.format("%H:%M"))
        };
        let _ = writeln!(
            out,
            "{check} {} ({when}, {}) {}",
            task.title,
            task.priority.label(),
            task.id
        );
    }
    out
}

pub fn habits(items: &[Habit], today: NaiveDate) -> String {
    if items.is_empty() {
        return "No habits.\n".to_string();
    }
    let mut out = String::new();
    for habit in items {
        let done = if streak::completed_on(habit, today) {
            "done today"
        } else {
            "not done today"
        };
        let days = if habit.streak == 1 { "day" } else { "days" };
        let _ = writeln!(
            out,
            "{} ({}) streak {} {days}, {done} {}",
            habit.name, habit.goal, habit.streak, habit.id
        );
    }
    out
}

pub fn notices(buffer: &LogBuffer) -> String {
    let mut out = String::new();
    for entry in buffer.iter() {
        let _ = writeln!(out, "{}: {}", notice_prefix(entry.level), entry.message);
    }
    out
}

fn notice_prefix(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Warn => "warning",
    }
}

fn star(favorite: bool) -> char {
    if favorite {
        '*'
    } else {
        ' '
    }
}

fn stamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|at| {
            at.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use assist_core::state::Priority;
    use assist_core::state::RecordId;
    use assist_core::state::Role;
    use pretty_assertions::assert_eq;

    use super::*;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn empty_collections_have_placeholder_lines() {
        assert_eq!(messages(&[], false), "No messages yet.\n");
        assert_eq!(texts(&[], true), "No favorite texts.\n");
        assert_eq!(tasks(&[]), "No tasks.\n");
        assert_eq!(habits(&[], day("2024-01-01")), "No habits.\n");
    }

    #[test]
    fn notices_render_one_warning_per_line() {
        let mut buffer = LogBuffer::default();
        assert_eq!(notices(&buffer), "");
        buffer.append(LogLevel::Warn, 0, "could not load tasks");
        buffer.append(LogLevel::Warn, 1, "could not save habits");
        assert_eq!(
            notices(&buffer),
            "warning: could not load tasks\nwarning: could not save habits\n"
        );
    }

    #[test]
    fn favorites_filter_hides_the_rest() {
        let items = vec![
            Message {
                id: RecordId::from("1"),
                role: Role::User,
                content: "hello".to_string(),
                timestamp: 0,
                favorite: false,
            },
            Message {
                id: RecordId::from("2"),
                role: Role::Assistant,
                content: "hi there".to_string(),
                timestamp: 0,
                favorite: true,
            },
        ];
        let out = messages(&items, true);
        assert!(out.contains("hi there"));
        assert!(!out.contains("hello"));
        assert!(out.starts_with("* 2 "));
    }

    #[test]
    fn task_lines_show_check_time_and_priority() {
        let items = vec![
            Task {
                id: RecordId::from("5"),
                title: "Dentist".to_string(),
                date: day("2024-03-01"),
                time: NaiveTime::from_hms_opt(9, 30, 0).expect("time"),
                completed: true,
                priority: Priority::High,
            },
            Task {
                id: RecordId::from("6"),
                title: "Groceries".to_string(),
                date: day("2024-03-02"),
                time: NaiveTime::MIN,
                completed: false,
                priority: Priority::Low,
            },
        ];
        assert_eq!(
            tasks(&items),
            "[x] Dentist (2024-03-01 at 09:30, high) 5\n[ ] Groceries (2024-03-02, low) 6\n"
        );
    }

    #[test]
    fn habit_line_reports_today() {
        let habit = Habit {
            id: RecordId::from("7"),
            name: "Read".to_string(),
            goal: "20 pages".to_string(),
            streak: 3,
            last_completed: Some(day("2024-01-03")),
            completed_dates: BTreeSet::from([day("2024-01-01"), day("2024-01-02"), day("2024-01-03")]),
        };
        assert_eq!(
            habits(std::slice::from_ref(&habit), day("2024-01-03")),
            "Read (20 pages) streak 3 days, done today 7\n"
        );
        assert_eq!(
            habits(&[habit], day("2024-01-04")),
            "Read (20 pages) streak 3 days, not done today 7\n"
        );
    }
}
