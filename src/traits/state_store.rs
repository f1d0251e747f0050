use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    Goal, Habit, IdealSelf, Reflection, RoadmapRecords, TaskCompletion, TodoWithTask,
};

/// Write side of onboarding.
#[async_trait]
pub trait RoadmapStore: Send + Sync {
    /// Persist a flattened roadmap. All rows land or none do.
    async fn persist_roadmap(&self, records: &RoadmapRecords) -> anyhow::Result<()>;
}

/// Per-user reads backing the dashboard. Absent rows yield empty results.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn get_habits(&self, user_id: &str) -> anyhow::Result<Vec<Habit>>;

    /// Todos left-joined with their parent task.
    async fn get_todos_with_tasks(&self, user_id: &str) -> anyhow::Result<Vec<TodoWithTask>>;

    async fn get_goals(&self, user_id: &str) -> anyhow::Result<Vec<Goal>>;

    /// First ideal-self row for the user, if any.
    async fn get_ideal_self(&self, user_id: &str) -> anyhow::Result<Option<IdealSelf>>;
}

/// Completion tracking. Each method returns `None` when the row does not
/// exist or belongs to another user.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn complete_habit(
        &self,
        user_id: &str,
        habit_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Habit>>;

    async fn complete_todo(
        &self,
        user_id: &str,
        todo_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<TodoWithTask>>;

    /// Mark a task complete and recompute its milestone's counters.
    async fn complete_task(
        &self,
        user_id: &str,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<TaskCompletion>>;
}

#[async_trait]
pub trait ReflectionStore: Send + Sync {
    async fn create_reflection(&self, reflection: &Reflection) -> anyhow::Result<()>;

    /// Newest first.
    async fn list_reflections(&self, user_id: &str) -> anyhow::Result<Vec<Reflection>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a bare user row if none exists for this id.
    async fn ensure_user(&self, user_id: &str) -> anyhow::Result<()>;

    /// Delete a user and, through cascades, everything they own.
    async fn delete_user(&self, user_id: &str) -> anyhow::Result<bool>;
}

/// Facade over the focused store traits so call sites can hold a single
/// `Arc<dyn StateStore>`.
pub trait StateStore:
    Send + Sync + RoadmapStore + DashboardStore + ProgressStore + ReflectionStore + UserStore
{
}

impl<T> StateStore for T where
    T: Send + Sync + RoadmapStore + DashboardStore + ProgressStore + ReflectionStore + UserStore
{
}
