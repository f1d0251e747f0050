use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::traits::{Goal, Habit, IdealSelf, Reflection, Task, Todo};
use crate::types::{GoalStatus, Priority, Recurrence};

/// Set restrictive file permissions (0600) on the database and WAL files.
#[cfg(unix)]
fn set_db_file_permissions(db_path: &str) {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::Permissions::from_mode(0o600);
    if let Err(e) = std::fs::set_permissions(db_path, mode.clone()) {
        tracing::warn!("Failed to set permissions on {}: {}", db_path, e);
    }
    for suffix in &["-wal", "-shm"] {
        let path = format!("{}{}", db_path, suffix);
        if std::path::Path::new(&path).exists() {
            if let Err(e) = std::fs::set_permissions(&path, mode.clone()) {
                tracing::warn!("Failed to set permissions on {}: {}", path, e);
            }
        }
    }
}

#[cfg(not(unix))]
fn set_db_file_permissions(_db_path: &str) {}

/// SQLite-backed store for users, roadmaps, progress and reflections.
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    pub async fn new(db_path: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        set_db_file_permissions(db_path);
        migrations::migrate_state(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }
}

// ==================== Row helpers ====================

fn parse_dt(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_opt_dt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn parse_json(s: Option<String>) -> Option<Value> {
    s.and_then(|s| serde_json::from_str(&s).ok())
}

fn json_text(v: &Option<Value>) -> Option<String> {
    v.as_ref().map(|v| v.to_string())
}

fn dt_text(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.map(|d| d.to_rfc3339())
}

fn row_to_ideal_self(row: &SqliteRow) -> IdealSelf {
    IdealSelf {
        id: row.get("id"),
        user_id: row.get("user_id"),
        description: row.get("description"),
        traits: parse_json(row.get("traits")),
        areas_to_improve: parse_json(row.get("areas_to_improve")),
        priority_areas: parse_json(row.get("priority_areas")),
        financial_vision: row.get("financial_vision"),
        health_vision: row.get("health_vision"),
        signature_habits: parse_json(row.get("signature_habits")),
        constraints: row.get("constraints"),
        goals: parse_json(row.get("goals")),
        created_at: parse_dt(row.get("created_at")),
        updated_at: parse_dt(row.get("updated_at")),
    }
}

fn row_to_goal(row: &SqliteRow) -> Goal {
    let status: String = row.get("status");
    Goal {
        id: row.get("id"),
        user_id: row.get("user_id"),
        ideal_self_id: row.get("ideal_self_id"),
        name: row.get("name"),
        description: row.get("description"),
        status: GoalStatus::from_str(&status),
        created_at: parse_dt(row.get("created_at")),
        updated_at: parse_dt(row.get("updated_at")),
    }
}

fn row_to_habit(row: &SqliteRow) -> Habit {
    let recurrence: String = row.get("recurrence");
    Habit {
        id: row.get("id"),
        user_id: row.get("user_id"),
        milestone_id: row.get("milestone_id"),
        name: row.get("name"),
        description: row.get("description"),
        recurrence: Recurrence::from_str(&recurrence),
        streak_count: row.get("streak_count"),
        last_completed: parse_opt_dt(row.get("last_completed")),
        completion_rate: row.get("completion_rate"),
        completion_history: parse_json(row.get("completion_history")),
        created_at: parse_dt(row.get("created_at")),
        updated_at: parse_dt(row.get("updated_at")),
    }
}

fn row_to_task(row: &SqliteRow) -> Task {
    let priority: String = row.get("priority");
    Task {
        id: row.get("id"),
        user_id: row.get("user_id"),
        milestone_id: row.get("milestone_id"),
        name: row.get("name"),
        description: row.get("description"),
        priority: Priority::from_str(&priority),
        completed_at: parse_opt_dt(row.get("completed_at")),
        target_date: parse_opt_dt(row.get("target_date")),
        created_at: parse_dt(row.get("created_at")),
        updated_at: parse_dt(row.get("updated_at")),
    }
}

fn row_to_todo(row: &SqliteRow) -> Todo {
    Todo {
        id: row.get("id"),
        user_id: row.get("user_id"),
        task_id: row.get("task_id"),
        name: row.get("name"),
        description: row.get("description"),
        is_completed: row.get("is_completed"),
        target_date: parse_dt(row.get("target_date")),
        completed_at: parse_opt_dt(row.get("completed_at")),
        created_at: parse_dt(row.get("created_at")),
        updated_at: parse_dt(row.get("updated_at")),
    }
}

fn row_to_reflection(row: &SqliteRow) -> Reflection {
    Reflection {
        id: row.get("id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        sentiment_score: row.get("sentiment_score"),
        keywords: parse_json(row.get("keywords")),
        mood: row.get("mood"),
        analyzed_at: parse_opt_dt(row.get("analyzed_at")),
        created_at: parse_dt(row.get("created_at")),
        updated_at: parse_dt(row.get("updated_at")),
    }
}

mod dashboard;
mod migrations;
mod progress;
mod reflections;
mod roadmap;
mod users;
