use super::*;
use async_trait::async_trait;

use crate::traits::TodoWithTask;

#[async_trait]
impl crate::traits::DashboardStore for SqliteStateStore {
    async fn get_habits(&self, user_id: &str) -> anyhow::Result<Vec<Habit>> {
        let rows = sqlx::query(
            "SELECT id, user_id, milestone_id, name, description, recurrence, streak_count,
                    last_completed, completion_rate, completion_history, created_at, updated_at
             FROM habits WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_habit).collect())
    }

    async fn get_todos_with_tasks(&self, user_id: &str) -> anyhow::Result<Vec<TodoWithTask>> {
        let rows = sqlx::query(
            "SELECT t.id, t.user_id, t.task_id, t.name, t.description, t.is_completed,
                    t.target_date, t.completed_at, t.created_at, t.updated_at,
                    k.id AS task_row_id, k.user_id AS task_user_id, k.milestone_id AS task_milestone_id,
                    k.name AS task_name, k.description AS task_description, k.priority AS task_priority,
                    k.completed_at AS task_completed_at, k.target_date AS task_target_date,
                    k.created_at AS task_created_at, k.updated_at AS task_updated_at
             FROM todos t
             LEFT JOIN tasks k ON k.id = t.task_id
             WHERE t.user_id = ?
             ORDER BY t.target_date ASC, t.rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let task_id: Option<String> = row.get("task_row_id");
            let task = task_id.map(|id| {
                let priority: Option<String> = row.get("task_priority");
                Task {
                    id,
                    user_id: row.get("task_user_id"),
                    milestone_id: row.get("task_milestone_id"),
                    name: row.get("task_name"),
                    description: row.get("task_description"),
                    priority: Priority::from_str(priority.as_deref().unwrap_or_default()),
                    completed_at: parse_opt_dt(row.get("task_completed_at")),
                    target_date: parse_opt_dt(row.get("task_target_date")),
                    created_at: parse_dt(row.get("task_created_at")),
                    updated_at: parse_dt(row.get("task_updated_at")),
                }
            });
            out.push(TodoWithTask {
                todo: row_to_todo(row),
                task,
            });
        }
        Ok(out)
    }

    async fn get_goals(&self, user_id: &str) -> anyhow::Result<Vec<Goal>> {
        let rows = sqlx::query(
            "SELECT id, user_id, ideal_self_id, name, description, status, created_at, updated_at
             FROM goals WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_goal).collect())
    }

    async fn get_ideal_self(&self, user_id: &str) -> anyhow::Result<Option<IdealSelf>> {
        let row = sqlx::query(
            "SELECT id, user_id, description, traits, areas_to_improve, priority_areas,
                    financial_vision, health_vision, signature_habits, constraints, goals,
                    created_at, updated_at
             FROM ideal_self WHERE user_id = ? ORDER BY created_at ASC, rowid ASC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_ideal_self))
    }
}
