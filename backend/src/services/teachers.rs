use sqlx::PgPool;

use crate::models::teacher::Teacher;

pub struct TeacherService;

impl TeacherService {
    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<Teacher>> {
        let teachers = sqlx::query_as::<_, Teacher>(
            "SELECT username, display_name, created_at FROM teachers ORDER BY username",
        )
        .fetch_all(pool)
        .await?;
        Ok(teachers)
    }

    /// Insert a teacher, or refresh the display name of an existing one.
    pub async fn upsert(
        pool: &PgPool,
        username: &str,
        display_name: Option<&str>,
    ) -> anyhow::Result<Teacher> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (username, display_name)
             VALUES ($1, $2)
             ON CONFLICT (username) DO UPDATE SET display_name = EXCLUDED.display_name
             RETURNING username, display_name, created_at",
        )
        .bind(username)
        .bind(display_name)
        .fetch_one(pool)
        .await?;
        Ok(teacher)
    }

    pub async fn remove(pool: &PgPool, username: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM teachers WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
