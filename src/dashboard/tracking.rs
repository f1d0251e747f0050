use chrono::{Local, Utc};
use serde::Serialize;
use tracing::info;

use super::{iso, require_user_id, summarize_habit, summarize_todo, DashboardError, HabitSummary, TodoSummary};
use crate::traits::{MilestoneProgress, StateStore};

const PROGRESS_FAILED: &str = "Failed to update progress. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletionView {
    pub task_id: String,
    pub completed_at: Option<String>,
    pub milestone: Option<MilestoneProgressView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneProgressView {
    pub milestone_id: String,
    pub tasks_total: i64,
    pub tasks_completed: i64,
    pub completion_rate: f64,
    pub completed_at: Option<String>,
}

impl From<MilestoneProgress> for MilestoneProgressView {
    fn from(progress: MilestoneProgress) -> Self {
        Self {
            milestone_id: progress.milestone_id,
            tasks_total: progress.tasks_total,
            tasks_completed: progress.tasks_completed,
            completion_rate: progress.completion_rate,
            completed_at: progress.completed_at.map(iso),
        }
    }
}

pub async fn complete_habit(
    store: &dyn StateStore,
    user_id: &str,
    habit_id: &str,
) -> Result<HabitSummary, DashboardError> {
    let user_id = require_user_id(user_id)?;
    let habit = store
        .complete_habit(user_id, habit_id, Utc::now())
        .await
        .map_err(|e| DashboardError::failed(PROGRESS_FAILED, e))?
        .ok_or(DashboardError::NotFound("Habit"))?;
    Ok(summarize_habit(&habit, Local::now().date_naive()))
}

pub async fn complete_todo(
    store: &dyn StateStore,
    user_id: &str,
    todo_id: &str,
) -> Result<TodoSummary, DashboardError> {
    let user_id = require_user_id(user_id)?;
    let row = store
        .complete_todo(user_id, todo_id, Utc::now())
        .await
        .map_err(|e| DashboardError::failed(PROGRESS_FAILED, e))?
        .ok_or(DashboardError::NotFound("Todo"))?;
    info!(user_id, todo_id, "Todo completed");
    Ok(summarize_todo(&row))
}

pub async fn complete_task(
    store: &dyn StateStore,
    user_id: &str,
    task_id: &str,
) -> Result<TaskCompletionView, DashboardError> {
    let user_id = require_user_id(user_id)?;
    let completion = store
        .complete_task(user_id, task_id, Utc::now())
        .await
        .map_err(|e| DashboardError::failed(PROGRESS_FAILED, e))?
        .ok_or(DashboardError::NotFound("Task"))?;
    Ok(TaskCompletionView {
        task_id: completion.task.id,
        completed_at: completion.task.completed_at.map(iso),
        milestone: completion.milestone.map(MilestoneProgressView::from),
    })
}
