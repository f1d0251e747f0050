use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{GoalStatus, Priority, Recurrence};

// ==================== Roadmap Data Model ====================
//
// Every row is owned by a user. List-valued columns are kept as raw JSON so the
// read side can decide how to coerce values that are not list-shaped.

/// The user's stated vision plus AI-derived traits. One per user by
/// convention; nothing enforces it and readers take the first row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdealSelf {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub traits: Option<Value>,
    /// Mirrors `priority_areas`; kept for older readers.
    pub areas_to_improve: Option<Value>,
    pub priority_areas: Option<Value>,
    pub financial_vision: Option<String>,
    pub health_vision: Option<String>,
    pub signature_habits: Option<Value>,
    pub constraints: Option<String>,
    /// Denormalized copy of the generated goal names.
    pub goals: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub ideal_self_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub user_id: String,
    pub goal_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub tasks_total: i64,
    pub tasks_completed: i64,
    /// 0.0 ..= 1.0
    pub completion_rate: f64,
    pub target_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub milestone_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed_at: Option<DateTime<Utc>>,
    pub target_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Priority is not stored here; it comes from the parent task at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub task_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub target_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub milestone_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub streak_count: Option<i64>,
    pub last_completed: Option<DateTime<Utc>>,
    pub completion_rate: Option<f64>,
    /// JSON array of `YYYY-MM-DD` strings.
    pub completion_history: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A free-text journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub id: String,
    pub user_id: String,
    pub content: String,
    /// -1.0 ..= 1.0, only present once analyzed.
    pub sentiment_score: Option<f64>,
    pub keywords: Option<Value>,
    pub mood: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A todo left-joined with its parent task.
#[derive(Debug, Clone)]
pub struct TodoWithTask {
    pub todo: Todo,
    pub task: Option<Task>,
}

/// Milestone counters after a task completion.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneProgress {
    pub milestone_id: String,
    pub tasks_total: i64,
    pub tasks_completed: i64,
    pub completion_rate: f64,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A completed task plus its milestone's counters, when it has a milestone.
#[derive(Debug, Clone)]
pub struct TaskCompletion {
    pub task: Task,
    pub milestone: Option<MilestoneProgress>,
}

/// A generated roadmap flattened into rows, parents before children.
#[derive(Debug, Clone)]
pub struct RoadmapRecords {
    pub user_id: String,
    pub ideal_self: IdealSelf,
    pub goals: Vec<Goal>,
    pub milestones: Vec<Milestone>,
    pub tasks: Vec<Task>,
    pub todos: Vec<Todo>,
    pub habits: Vec<Habit>,
}
