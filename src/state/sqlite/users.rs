use super::*;
use async_trait::async_trait;

#[async_trait]
impl crate::traits::UserStore for SqliteStateStore {
    async fn ensure_user(&self, user_id: &str) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("INSERT OR IGNORE INTO users (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
