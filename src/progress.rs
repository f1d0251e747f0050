//! Streak and completion-rate bookkeeping for habits and milestones.
//!
//! Everything here is pure; the store feeds in the current row and writes back
//! the result. A "period" is a calendar day for daily habits and an ISO week
//! for weekly ones, both in local time.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde_json::Value;

use crate::traits::Habit;
use crate::types::Recurrence;

/// New values for a habit row after one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitUpdate {
    pub streak_count: i64,
    pub completion_history: Vec<String>,
    pub completion_rate: f64,
    pub last_completed: DateTime<Utc>,
}

pub fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

fn period_of(recurrence: Recurrence, date: NaiveDate) -> (i32, u32) {
    match recurrence {
        Recurrence::Daily => (date.year(), date.ordinal()),
        Recurrence::Weekly => {
            let week = date.iso_week();
            (week.year(), week.week())
        }
    }
}

fn previous_period(recurrence: Recurrence, date: NaiveDate) -> (i32, u32) {
    let step = match recurrence {
        Recurrence::Daily => Duration::days(1),
        Recurrence::Weekly => Duration::days(7),
    };
    period_of(recurrence, date - step)
}

/// Streak after completing on `today`. Same period keeps the streak, the
/// immediately preceding period extends it, anything older restarts at 1.
pub fn next_streak(
    recurrence: Recurrence,
    current: i64,
    last_completed: Option<NaiveDate>,
    today: NaiveDate,
) -> i64 {
    let Some(last) = last_completed else {
        return 1;
    };
    let last_period = period_of(recurrence, last);
    if last_period == period_of(recurrence, today) {
        current.max(1)
    } else if last_period == previous_period(recurrence, today) {
        current.max(0) + 1
    } else {
        1
    }
}

/// Number of periods from `created` through `today`, inclusive. Never below 1.
fn periods_since(recurrence: Recurrence, created: NaiveDate, today: NaiveDate) -> i64 {
    if today <= created {
        return 1;
    }
    match recurrence {
        Recurrence::Daily => (today - created).num_days() + 1,
        Recurrence::Weekly => {
            let monday = |d: NaiveDate| d - Duration::days(d.weekday().num_days_from_monday() as i64);
            (monday(today) - monday(created)).num_days() / 7 + 1
        }
    }
}

/// Share of periods since creation with at least one completion, in 0..=1.
pub fn completion_rate(
    recurrence: Recurrence,
    created: NaiveDate,
    history: &[String],
    today: NaiveDate,
) -> f64 {
    let completed: BTreeSet<(i32, u32)> = history
        .iter()
        .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .filter(|d| *d <= today)
        .map(|d| period_of(recurrence, d))
        .collect();
    let total = periods_since(recurrence, created, today);
    (completed.len() as f64 / total as f64).clamp(0.0, 1.0)
}

/// Read a stored history value, ignoring anything that is not a string.
pub fn history_from_value(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Apply one completion at `now` to `habit`.
pub fn complete_habit(habit: &Habit, now: DateTime<Utc>) -> HabitUpdate {
    let today = local_date(now);
    let last = habit.last_completed.map(local_date);
    let streak = next_streak(
        habit.recurrence,
        habit.streak_count.unwrap_or(0),
        last,
        today,
    );

    let mut history = history_from_value(habit.completion_history.as_ref());
    let stamp = today.format("%Y-%m-%d").to_string();
    if !history.contains(&stamp) {
        history.push(stamp);
    }

    let rate = completion_rate(
        habit.recurrence,
        local_date(habit.created_at),
        &history,
        today,
    );

    HabitUpdate {
        streak_count: streak,
        completion_history: history,
        completion_rate: rate,
        last_completed: now,
    }
}

/// Milestone completion rate for `completed` of `total` tasks.
pub fn milestone_rate(total: i64, completed: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (completed as f64 / total as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_streak_rules() {
        let today = d("2026-03-10");
        assert_eq!(next_streak(Recurrence::Daily, 0, None, today), 1);
        assert_eq!(next_streak(Recurrence::Daily, 4, Some(d("2026-03-10")), today), 4);
        assert_eq!(next_streak(Recurrence::Daily, 4, Some(d("2026-03-09")), today), 5);
        assert_eq!(next_streak(Recurrence::Daily, 4, Some(d("2026-03-08")), today), 1);
        // Year boundary.
        assert_eq!(
            next_streak(Recurrence::Daily, 2, Some(d("2025-12-31")), d("2026-01-01")),
            3
        );
    }

    #[test]
    fn test_weekly_streak_rules() {
        // 2026-03-09 is a Monday.
        let today = d("2026-03-12");
        assert_eq!(next_streak(Recurrence::Weekly, 2, Some(d("2026-03-09")), today), 2);
        assert_eq!(next_streak(Recurrence::Weekly, 2, Some(d("2026-03-08")), today), 3);
        assert_eq!(next_streak(Recurrence::Weekly, 2, Some(d("2026-03-02")), today), 3);
        assert_eq!(next_streak(Recurrence::Weekly, 2, Some(d("2026-03-01")), today), 1);
    }

    #[test]
    fn test_completion_rate_daily() {
        let history = vec!["2026-03-01".to_string(), "2026-03-03".to_string()];
        let rate = completion_rate(Recurrence::Daily, d("2026-03-01"), &history, d("2026-03-04"));
        assert!((rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_rate_weekly_and_clamped() {
        let history = vec![
            "2026-03-02".to_string(),
            "2026-03-03".to_string(),
            "2026-03-10".to_string(),
            "not a date".to_string(),
        ];
        let rate = completion_rate(Recurrence::Weekly, d("2026-03-04"), &history, d("2026-03-11"));
        assert!((rate - 1.0).abs() < f64::EPSILON);

        let same_day = completion_rate(
            Recurrence::Daily,
            d("2026-03-04"),
            &["2026-03-04".to_string()],
            d("2026-03-04"),
        );
        assert!((same_day - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_history_from_value() {
        let v = json!(["2026-01-01", 5, "2026-01-02"]);
        assert_eq!(history_from_value(Some(&v)), vec!["2026-01-01", "2026-01-02"]);
        assert!(history_from_value(Some(&json!("x"))).is_empty());
        assert!(history_from_value(None).is_empty());
    }

    #[test]
    fn test_complete_habit_twice_same_day() {
        let now = Utc::now();
        let habit = Habit {
            id: "h1".to_string(),
            user_id: "u1".to_string(),
            milestone_id: None,
            name: "Read".to_string(),
            description: None,
            recurrence: Recurrence::Daily,
            streak_count: Some(0),
            last_completed: None,
            completion_rate: Some(0.0),
            completion_history: None,
            created_at: now,
            updated_at: now,
        };

        let first = complete_habit(&habit, now);
        assert_eq!(first.streak_count, 1);
        assert_eq!(first.completion_history.len(), 1);
        assert!((first.completion_rate - 1.0).abs() < f64::EPSILON);

        let mut again = habit.clone();
        again.streak_count = Some(first.streak_count);
        again.last_completed = Some(first.last_completed);
        again.completion_history = Some(json!(first.completion_history));
        let second = complete_habit(&again, now);
        assert_eq!(second.streak_count, 1);
        assert_eq!(second.completion_history.len(), 1);
    }

    #[test]
    fn test_milestone_rate() {
        assert_eq!(milestone_rate(0, 0), 0.0);
        assert_eq!(milestone_rate(4, 1), 0.25);
        assert_eq!(milestone_rate(2, 5), 1.0);
    }
}
