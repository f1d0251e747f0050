use sqlx::SqlitePool;
use tracing::info;

/// Create the roadmap schema. Safe to run on every startup.
///
/// Every table carries `user_id` with `ON DELETE CASCADE`. Inside the tree,
/// goal → ideal_self and milestone → goal cascade; task → milestone,
/// todo → task and habit → milestone are set to NULL instead.
pub(crate) async fn migrate_state(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT,
            name TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ideal_self (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            traits TEXT,
            areas_to_improve TEXT,
            priority_areas TEXT,
            financial_vision TEXT,
            health_vision TEXT,
            signature_habits TEXT,
            constraints TEXT,
            goals TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS goals (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            ideal_self_id TEXT REFERENCES ideal_self(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS milestones (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            goal_id TEXT REFERENCES goals(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            tasks_total INTEGER NOT NULL DEFAULT 0,
            tasks_completed INTEGER NOT NULL DEFAULT 0,
            completion_rate REAL NOT NULL DEFAULT 0,
            target_date TEXT,
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            milestone_id TEXT REFERENCES milestones(id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            description TEXT,
            priority TEXT NOT NULL DEFAULT 'medium',
            completed_at TEXT,
            target_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            task_id TEXT REFERENCES tasks(id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            description TEXT,
            is_completed INTEGER DEFAULT 0,
            target_date TEXT NOT NULL,
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            milestone_id TEXT REFERENCES milestones(id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            description TEXT,
            recurrence TEXT NOT NULL DEFAULT 'daily',
            streak_count INTEGER DEFAULT 0,
            last_completed TEXT,
            completion_rate REAL DEFAULT 0,
            completion_history TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS reflections (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            sentiment_score REAL,
            keywords TEXT,
            mood TEXT,
            analyzed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    for (name, table, column) in [
        ("idx_ideal_self_user", "ideal_self", "user_id"),
        ("idx_goals_user", "goals", "user_id"),
        ("idx_milestones_goal", "milestones", "goal_id"),
        ("idx_tasks_milestone", "tasks", "milestone_id"),
        ("idx_todos_user", "todos", "user_id"),
        ("idx_todos_task", "todos", "task_id"),
        ("idx_habits_user", "habits", "user_id"),
        ("idx_reflections_user", "reflections", "user_id"),
    ] {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}({})",
            name, table, column
        ))
        .execute(pool)
        .await?;
    }

    info!("Roadmap schema migration complete");
    Ok(())
}
