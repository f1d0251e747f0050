//! Read-side aggregation: per-user summaries for the dashboard, plus the
//! completion and reflection operations that feed it.

mod metrics;
mod reflections;
mod tracking;

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::progress::local_date;
use crate::traits::{Goal, Habit, IdealSelf, StateStore, TodoWithTask};
use crate::types::{Priority, Recurrence};

pub use metrics::DashboardMetrics;
pub use reflections::{create_reflection, list_reflections, ReflectionSummary, ReflectionView};
pub use tracking::{complete_habit, complete_task, complete_todo};

pub const DASHBOARD_FAILED: &str = "Failed to load dashboard data. Please try again.";

#[derive(Debug)]
pub enum DashboardError {
    /// No user id supplied. Raised before any I/O.
    MissingUserId,
    /// The row does not exist or belongs to someone else.
    NotFound(&'static str),
    /// Caller input was rejected.
    Invalid(String),
    /// Store failure. Only the generic sentence is displayed.
    Failed {
        message: &'static str,
        source: anyhow::Error,
    },
}

impl DashboardError {
    fn failed(message: &'static str, source: anyhow::Error) -> Self {
        error!(error = %format!("{:#}", source), "{}", message);
        DashboardError::Failed { message, source }
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::MissingUserId => {
                write!(f, "User ID is required to load dashboard data.")
            }
            DashboardError::NotFound(what) => write!(f, "{} not found.", what),
            DashboardError::Invalid(msg) => write!(f, "{}", msg),
            DashboardError::Failed { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Failed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

fn require_user_id(user_id: &str) -> Result<&str, DashboardError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        Err(DashboardError::MissingUserId)
    } else {
        Ok(trimmed)
    }
}

fn iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ==================== Summaries ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub streak: i64,
    pub completion_rate: f64,
    pub last_completed: Option<String>,
    pub completed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealSelfSummary {
    pub id: String,
    pub description: String,
    pub priority_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub user_id: String,
    pub habits: Vec<HabitSummary>,
    pub todos: Vec<TodoSummary>,
    pub goals: Vec<GoalSummary>,
    pub ideal_self: Option<IdealSelfSummary>,
}

/// True iff `last_completed` falls on `today` in local time.
pub fn completed_today(last_completed: Option<DateTime<Utc>>, today: NaiveDate) -> bool {
    last_completed.is_some_and(|ts| local_date(ts) == today)
}

/// Keep list-shaped values only. Non-string scalars are stringified; nulls
/// and nested structures are dropped.
pub fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

pub fn summarize_habit(habit: &Habit, today: NaiveDate) -> HabitSummary {
    HabitSummary {
        id: habit.id.clone(),
        name: habit.name.clone(),
        description: habit.description.clone(),
        recurrence: habit.recurrence,
        streak: habit.streak_count.unwrap_or(0),
        completion_rate: habit.completion_rate.unwrap_or(0.0),
        last_completed: habit.last_completed.map(iso),
        completed_today: completed_today(habit.last_completed, today),
    }
}

pub fn summarize_todo(row: &TodoWithTask) -> TodoSummary {
    let todo = &row.todo;
    TodoSummary {
        id: todo.id.clone(),
        name: todo.name.clone(),
        description: todo
            .description
            .clone()
            .or_else(|| row.task.as_ref().and_then(|t| t.description.clone())),
        completed: todo.is_completed.unwrap_or(false),
        priority: row.task.as_ref().map(|t| t.priority).unwrap_or_default(),
        target_date: Some(iso(todo.target_date)),
    }
}

fn summarize_goal(goal: &Goal) -> GoalSummary {
    GoalSummary {
        id: goal.id.clone(),
        name: goal.name.clone(),
        description: goal.description.clone(),
    }
}

fn summarize_ideal_self(ideal: &IdealSelf) -> IdealSelfSummary {
    IdealSelfSummary {
        id: ideal.id.clone(),
        description: ideal.description.clone(),
        priority_areas: coerce_string_list(ideal.priority_areas.as_ref()),
    }
}

/// Assemble the dashboard from already-fetched rows.
pub fn build_dashboard(
    user_id: &str,
    habits: &[Habit],
    todos: &[TodoWithTask],
    goals: &[Goal],
    ideal_self: Option<&IdealSelf>,
    today: NaiveDate,
) -> DashboardData {
    DashboardData {
        user_id: user_id.to_string(),
        habits: habits.iter().map(|h| summarize_habit(h, today)).collect(),
        todos: todos.iter().map(summarize_todo).collect(),
        goals: goals.iter().map(summarize_goal).collect(),
        ideal_self: ideal_self.map(summarize_ideal_self),
    }
}

/// Load a user's dashboard. The four reads run concurrently.
pub async fn load_dashboard(
    store: &dyn StateStore,
    user_id: &str,
) -> Result<DashboardData, DashboardError> {
    let user_id = require_user_id(user_id)?;

    let (habits, todos, goals, ideal_self) = tokio::try_join!(
        store.get_habits(user_id),
        store.get_todos_with_tasks(user_id),
        store.get_goals(user_id),
        store.get_ideal_self(user_id),
    )
    .map_err(|e| DashboardError::failed(DASHBOARD_FAILED, e))?;

    debug!(
        user_id,
        habits = habits.len(),
        todos = todos.len(),
        goals = goals.len(),
        has_ideal_self = ideal_self.is_some(),
        "Dashboard rows loaded"
    );

    Ok(build_dashboard(
        user_id,
        &habits,
        &todos,
        &goals,
        ideal_self.as_ref(),
        Local::now().date_naive(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::{build_records, NormalizedAnswers, OnboardingAnswers};
    use crate::testing::{sample_roadmap_json, temp_store};
    use crate::traits::store_prelude::*;
    use crate::traits::{GeneratedRoadmap, Task, Todo};
    use chrono::Duration;
    use serde_json::json;

    fn habit(last_completed: Option<DateTime<Utc>>) -> Habit {
        let now = Utc::now();
        Habit {
            id: "h1".to_string(),
            user_id: "u1".to_string(),
            milestone_id: None,
            name: "Meditate".to_string(),
            description: None,
            recurrence: Recurrence::Daily,
            streak_count: None,
            last_completed,
            completion_rate: None,
            completion_history: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn todo(description: Option<&str>, completed: Option<bool>) -> Todo {
        let now = Utc::now();
        Todo {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            task_id: None,
            name: "Stretch".to_string(),
            description: description.map(str::to_string),
            is_completed: completed,
            target_date: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn task(priority: Priority) -> Task {
        let now = Utc::now();
        Task {
            id: "k1".to_string(),
            user_id: "u1".to_string(),
            milestone_id: None,
            name: "Mobility".to_string(),
            description: Some("Daily mobility work".to_string()),
            priority,
            completed_at: None,
            target_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completed_today() {
        let now = Utc::now();
        let today = local_date(now);
        assert!(completed_today(Some(now), today));
        assert!(!completed_today(Some(now - Duration::days(1)), today));
        assert!(!completed_today(None, today));
    }

    #[test]
    fn test_habit_summary_defaults() {
        let summary = summarize_habit(&habit(None), Local::now().date_naive());
        assert_eq!(summary.streak, 0);
        assert_eq!(summary.completion_rate, 0.0);
        assert_eq!(summary.last_completed, None);
        assert!(!summary.completed_today);
    }

    #[test]
    fn test_todo_priority_and_description_fallback() {
        let linked = summarize_todo(&TodoWithTask {
            todo: todo(None, None),
            task: Some(task(Priority::High)),
        });
        assert_eq!(linked.priority, Priority::High);
        assert_eq!(linked.description.as_deref(), Some("Daily mobility work"));
        assert!(!linked.completed);

        let own = summarize_todo(&TodoWithTask {
            todo: todo(Some("Own text"), Some(true)),
            task: Some(task(Priority::Low)),
        });
        assert_eq!(own.description.as_deref(), Some("Own text"));
        assert_eq!(own.priority, Priority::Low);
        assert!(own.completed);

        let orphan = summarize_todo(&TodoWithTask {
            todo: todo(None, Some(false)),
            task: None,
        });
        assert_eq!(orphan.priority, Priority::Medium);
        assert_eq!(orphan.description, None);
    }

    #[test]
    fn test_coerce_string_list() {
        assert_eq!(coerce_string_list(Some(&json!(["a", "b"]))), vec!["a", "b"]);
        assert_eq!(coerce_string_list(Some(&json!(["a", 3, null]))), vec!["a", "3"]);
        assert!(coerce_string_list(Some(&json!(null))).is_empty());
        assert!(coerce_string_list(Some(&json!({"a": 1}))).is_empty());
        assert!(coerce_string_list(Some(&json!("health"))).is_empty());
        assert!(coerce_string_list(None).is_empty());
    }

    #[test]
    fn test_summary_json_shape() {
        let data = build_dashboard(
            "u1",
            &[habit(None)],
            &[],
            &[],
            None,
            Local::now().date_naive(),
        );
        let v = serde_json::to_value(&data).unwrap();
        assert_eq!(v["userId"], "u1");
        assert_eq!(v["idealSelf"], Value::Null);
        assert_eq!(v["habits"][0]["completedToday"], false);
        assert_eq!(v["habits"][0]["recurrence"], "daily");
        assert_eq!(v["habits"][0]["completionRate"], 0.0);
    }

    #[tokio::test]
    async fn test_empty_user_gets_empty_dashboard() {
        let (store, _db) = temp_store().await;
        let data = load_dashboard(store.as_ref(), "nobody").await.unwrap();
        assert!(data.habits.is_empty());
        assert!(data.todos.is_empty());
        assert!(data.goals.is_empty());
        assert!(data.ideal_self.is_none());
    }

    #[tokio::test]
    async fn test_missing_user_id() {
        let (store, _db) = temp_store().await;
        let err = load_dashboard(store.as_ref(), "").await.unwrap_err();
        assert!(matches!(err, DashboardError::MissingUserId));
        assert_eq!(err.to_string(), "User ID is required to load dashboard data.");
    }

    #[tokio::test]
    async fn test_dashboard_after_ingestion() {
        let (store, _db) = temp_store().await;
        let roadmap: GeneratedRoadmap =
            serde_json::from_str(&sample_roadmap_json(2, 1, 3, 1, 2)).unwrap();
        let answers = NormalizedAnswers::from_answers(&OnboardingAnswers {
            ideal_self_vision: "Vision".to_string(),
            priority_areas: vec!["health".to_string()],
            ..Default::default()
        });
        let records = build_records("u1", &answers, &roadmap, Utc::now()).unwrap();
        store.persist_roadmap(&records).await.unwrap();

        let data = load_dashboard(store.as_ref(), "u1").await.unwrap();
        assert_eq!(data.habits.len(), 2);
        assert_eq!(data.todos.len(), 6);
        assert_eq!(data.goals.len(), 2);
        let ideal = data.ideal_self.unwrap();
        assert_eq!(ideal.description, "Vision");
        assert_eq!(ideal.priority_areas, vec!["health"]);

        // Each todo inherits its task's priority.
        let by_task: std::collections::HashMap<_, _> = records
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.priority))
            .collect();
        let mut want: Vec<_> = records
            .todos
            .iter()
            .map(|t| by_task[t.task_id.as_ref().unwrap()])
            .collect();
        let mut got: Vec<_> = data.todos.iter().map(|t| t.priority).collect();
        got.sort_by_key(|p| p.as_str());
        want.sort_by_key(|p| p.as_str());
        assert_eq!(got, want);
        assert!(data.todos.iter().all(|t| t.description.as_deref() == Some("Do the thing")));
    }

    #[tokio::test]
    async fn test_non_list_priority_areas_read_as_empty() {
        let (store, _db) = temp_store().await;
        store.ensure_user("u1").await.unwrap();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO ideal_self (id, user_id, description, priority_areas, created_at, updated_at)
             VALUES ('i1', 'u1', 'Vision', NULL, ?, ?)",
        )
        .bind(&now)
        .bind(&now)
        .execute(&store.pool())
        .await
        .unwrap();

        let data = load_dashboard(store.as_ref(), "u1").await.unwrap();
        assert_eq!(data.ideal_self.unwrap().priority_areas, Vec::<String>::new());
    }
}
