use super::*;
use async_trait::async_trait;
use tracing::info;

use crate::progress::{complete_habit, milestone_rate};
use crate::traits::{MilestoneProgress, TaskCompletion, TodoWithTask};

impl SqliteStateStore {
    async fn find_task(&self, user_id: &str, task_id: &str) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query(
            "SELECT id, user_id, milestone_id, name, description, priority,
                    completed_at, target_date, created_at, updated_at
             FROM tasks WHERE id = ? AND user_id = ?",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_task))
    }
}

#[async_trait]
impl crate::traits::ProgressStore for SqliteStateStore {
    async fn complete_habit(
        &self,
        user_id: &str,
        habit_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Habit>> {
        let row = sqlx::query(
            "SELECT id, user_id, milestone_id, name, description, recurrence, streak_count,
                    last_completed, completion_rate, completion_history, created_at, updated_at
             FROM habits WHERE id = ? AND user_id = ?",
        )
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut habit = row_to_habit(&row);
        let update = complete_habit(&habit, now);
        let history = serde_json::to_string(&update.completion_history)?;

        sqlx::query(
            "UPDATE habits
             SET streak_count = ?, last_completed = ?, completion_rate = ?,
                 completion_history = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(update.streak_count)
        .bind(update.last_completed.to_rfc3339())
        .bind(update.completion_rate)
        .bind(&history)
        .bind(now.to_rfc3339())
        .bind(habit_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        info!(
            habit_id,
            streak = update.streak_count,
            rate = update.completion_rate,
            "Habit completed"
        );

        habit.streak_count = Some(update.streak_count);
        habit.last_completed = Some(update.last_completed);
        habit.completion_rate = Some(update.completion_rate);
        habit.completion_history = Some(serde_json::Value::from(update.completion_history));
        habit.updated_at = now;
        Ok(Some(habit))
    }

    async fn complete_todo(
        &self,
        user_id: &str,
        todo_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<TodoWithTask>> {
        let row = sqlx::query(
            "SELECT id, user_id, task_id, name, description, is_completed,
                    target_date, completed_at, created_at, updated_at
             FROM todos WHERE id = ? AND user_id = ?",
        )
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut todo = row_to_todo(&row);

        // Completing twice keeps the first completion time.
        let completed_at = todo.completed_at.unwrap_or(now);
        sqlx::query(
            "UPDATE todos SET is_completed = 1, completed_at = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(completed_at.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(todo_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        todo.is_completed = Some(true);
        todo.completed_at = Some(completed_at);
        todo.updated_at = now;

        let task = match todo.task_id.as_deref() {
            Some(task_id) => self.find_task(user_id, task_id).await?,
            None => None,
        };
        Ok(Some(TodoWithTask { todo, task }))
    }

    async fn complete_task(
        &self,
        user_id: &str,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<TaskCompletion>> {
        let Some(mut task) = self.find_task(user_id, task_id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;
        let completed_at = task.completed_at.unwrap_or(now);
        sqlx::query("UPDATE tasks SET completed_at = ?, updated_at = ? WHERE id = ?")
            .bind(completed_at.to_rfc3339())
            .bind(now.to_rfc3339())
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        task.completed_at = Some(completed_at);
        task.updated_at = now;

        let milestone = match task.milestone_id.clone() {
            Some(milestone_id) => {
                let counts = sqlx::query(
                    "SELECT COUNT(*) AS total,
                            COALESCE(SUM(CASE WHEN completed_at IS NOT NULL THEN 1 ELSE 0 END), 0) AS done
                     FROM tasks WHERE milestone_id = ?",
                )
                .bind(&milestone_id)
                .fetch_one(&mut *tx)
                .await?;
                let total: i64 = counts.get("total");
                let done: i64 = counts.get("done");
                let rate = milestone_rate(total, done);

                let previous: Option<String> =
                    sqlx::query_scalar::<_, Option<String>>("SELECT completed_at FROM milestones WHERE id = ?")
                        .bind(&milestone_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .flatten();
                let milestone_done_at = if total > 0 && done >= total {
                    Some(parse_opt_dt(previous).unwrap_or(now))
                } else {
                    None
                };

                sqlx::query(
                    "UPDATE milestones
                     SET tasks_total = ?, tasks_completed = ?, completion_rate = ?,
                         completed_at = ?, updated_at = ?
                     WHERE id = ?",
                )
                .bind(total)
                .bind(done)
                .bind(rate)
                .bind(dt_text(&milestone_done_at))
                .bind(now.to_rfc3339())
                .bind(&milestone_id)
                .execute(&mut *tx)
                .await?;

                Some(MilestoneProgress {
                    milestone_id,
                    tasks_total: total,
                    tasks_completed: done,
                    completion_rate: rate,
                    completed_at: milestone_done_at,
                })
            }
            None => None,
        };
        tx.commit().await?;

        info!(task_id, milestone = ?milestone.as_ref().map(|m| &m.milestone_id), "Task completed");
        Ok(Some(TaskCompletion { task, milestone }))
    }
}
