use serde::Serialize;

use super::DashboardData;

const XP_PER_HABIT: i64 = 10;
const XP_PER_TODO: i64 = 5;
const XP_PER_LEVEL: i64 = 1000;

/// Headline numbers derived from a [`DashboardData`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Percent of habits completed today.
    pub habit_progress: f64,
    /// Percent of todos completed.
    pub todo_progress: f64,
    pub daily_score: f64,
    /// Longest current habit streak.
    pub current_streak: i64,
    pub xp_earned: i64,
    pub level: i64,
    pub xp_for_next_level: i64,
    pub weekly_insight: String,
    pub needs_onboarding: bool,
}

fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

impl DashboardMetrics {
    pub fn from_data(data: &DashboardData) -> Self {
        let habits_done = data.habits.iter().filter(|h| h.completed_today).count();
        let todos_done = data.todos.iter().filter(|t| t.completed).count();

        let habit_progress = percent(habits_done, data.habits.len());
        let todo_progress = percent(todos_done, data.todos.len());
        let xp_earned = habits_done as i64 * XP_PER_HABIT + todos_done as i64 * XP_PER_TODO;
        let level = xp_earned / XP_PER_LEVEL + 1;

        let weekly_insight = match &data.ideal_self {
            Some(ideal) => {
                let focus = ideal
                    .priority_areas
                    .iter()
                    .take(2)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" and ");
                let focus = if focus.is_empty() {
                    "your top priorities".to_string()
                } else {
                    focus
                };
                format!("Focus on {} this week.", focus)
            }
            None => "Your AI roadmap will drop here once you complete onboarding.".to_string(),
        };

        Self {
            habit_progress,
            todo_progress,
            daily_score: (habit_progress + todo_progress) / 2.0,
            current_streak: data.habits.iter().map(|h| h.streak).max().unwrap_or(0),
            xp_earned,
            level,
            xp_for_next_level: level * XP_PER_LEVEL - xp_earned,
            weekly_insight,
            needs_onboarding: data.habits.is_empty()
                && data.todos.is_empty()
                && data.goals.is_empty()
                && data.ideal_self.is_none(),
        }
    }
}
