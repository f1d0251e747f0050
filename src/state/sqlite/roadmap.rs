use super::*;
use async_trait::async_trait;
use tracing::info;

use crate::traits::RoadmapRecords;

#[async_trait]
impl crate::traits::RoadmapStore for SqliteStateStore {
    async fn persist_roadmap(&self, records: &RoadmapRecords) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT OR IGNORE INTO users (id, created_at, updated_at) VALUES (?, ?, ?)",
        )
        .bind(&records.user_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let ideal = &records.ideal_self;
        sqlx::query(
            "INSERT INTO ideal_self (
                id, user_id, description, traits, areas_to_improve, priority_areas,
                financial_vision, health_vision, signature_habits, constraints, goals,
                created_at, updated_at
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&ideal.id)
        .bind(&ideal.user_id)
        .bind(&ideal.description)
        .bind(json_text(&ideal.traits))
        .bind(json_text(&ideal.areas_to_improve))
        .bind(json_text(&ideal.priority_areas))
        .bind(&ideal.financial_vision)
        .bind(&ideal.health_vision)
        .bind(json_text(&ideal.signature_habits))
        .bind(&ideal.constraints)
        .bind(json_text(&ideal.goals))
        .bind(ideal.created_at.to_rfc3339())
        .bind(ideal.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for goal in &records.goals {
            sqlx::query(
                "INSERT INTO goals (id, user_id, ideal_self_id, name, description, status, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&goal.id)
            .bind(&goal.user_id)
            .bind(&goal.ideal_self_id)
            .bind(&goal.name)
            .bind(&goal.description)
            .bind(goal.status.as_str())
            .bind(goal.created_at.to_rfc3339())
            .bind(goal.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for milestone in &records.milestones {
            sqlx::query(
                "INSERT INTO milestones (
                    id, user_id, goal_id, name, description, tasks_total, tasks_completed,
                    completion_rate, target_date, completed_at, created_at, updated_at
                 )
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&milestone.id)
            .bind(&milestone.user_id)
            .bind(&milestone.goal_id)
            .bind(&milestone.name)
            .bind(&milestone.description)
            .bind(milestone.tasks_total)
            .bind(milestone.tasks_completed)
            .bind(milestone.completion_rate)
            .bind(dt_text(&milestone.target_date))
            .bind(dt_text(&milestone.completed_at))
            .bind(milestone.created_at.to_rfc3339())
            .bind(milestone.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for task in &records.tasks {
            sqlx::query(
                "INSERT INTO tasks (
                    id, user_id, milestone_id, name, description, priority,
                    completed_at, target_date, created_at, updated_at
                 )
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&task.id)
            .bind(&task.user_id)
            .bind(&task.milestone_id)
            .bind(&task.name)
            .bind(&task.description)
            .bind(task.priority.as_str())
            .bind(dt_text(&task.completed_at))
            .bind(dt_text(&task.target_date))
            .bind(task.created_at.to_rfc3339())
            .bind(task.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for todo in &records.todos {
            sqlx::query(
                "INSERT INTO todos (
                    id, user_id, task_id, name, description, is_completed,
                    target_date, completed_at, created_at, updated_at
                 )
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&todo.id)
            .bind(&todo.user_id)
            .bind(&todo.task_id)
            .bind(&todo.name)
            .bind(&todo.description)
            .bind(todo.is_completed)
            .bind(todo.target_date.to_rfc3339())
            .bind(dt_text(&todo.completed_at))
            .bind(todo.created_at.to_rfc3339())
            .bind(todo.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for habit in &records.habits {
            sqlx::query(
                "INSERT INTO habits (
                    id, user_id, milestone_id, name, description, recurrence, streak_count,
                    last_completed, completion_rate, completion_history, created_at, updated_at
                 )
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&habit.id)
            .bind(&habit.user_id)
            .bind(&habit.milestone_id)
            .bind(&habit.name)
            .bind(&habit.description)
            .bind(habit.recurrence.as_str())
            .bind(habit.streak_count)
            .bind(dt_text(&habit.last_completed))
            .bind(habit.completion_rate)
            .bind(json_text(&habit.completion_history))
            .bind(habit.created_at.to_rfc3339())
            .bind(habit.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            user_id = %records.user_id,
            goals = records.goals.len(),
            milestones = records.milestones.len(),
            tasks = records.tasks.len(),
            todos = records.todos.len(),
            habits = records.habits.len(),
            "Roadmap persisted"
        );
        Ok(())
    }
}
