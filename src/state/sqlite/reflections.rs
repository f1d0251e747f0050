use super::*;
use async_trait::async_trait;

#[async_trait]
impl crate::traits::ReflectionStore for SqliteStateStore {
    async fn create_reflection(&self, reflection: &Reflection) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO reflections (
                id, user_id, content, sentiment_score, keywords, mood, analyzed_at, created_at, updated_at
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&reflection.id)
        .bind(&reflection.user_id)
        .bind(&reflection.content)
        .bind(reflection.sentiment_score)
        .bind(json_text(&reflection.keywords))
        .bind(&reflection.mood)
        .bind(dt_text(&reflection.analyzed_at))
        .bind(reflection.created_at.to_rfc3339())
        .bind(reflection.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_reflections(&self, user_id: &str) -> anyhow::Result<Vec<Reflection>> {
        let rows = sqlx::query(
            "SELECT id, user_id, content, sentiment_score, keywords, mood, analyzed_at, created_at, updated_at
             FROM reflections WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_reflection).collect())
    }
}
