/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id BIGSERIAL PRIMARY KEY,
///     content TEXT,
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

const COMMENT_COLUMNS: &str = "id, content, task_id, user_id, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: Option<String>,
    pub task_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub content: Option<String>,
    pub task_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateComment {
    pub content: Option<String>,
}

impl Comment {
    pub async fn create(conn: &mut PgConnection, data: CreateComment) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (content, task_id, user_id) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(data.content)
            .bind(data.task_id)
            .bind(data.user_id)
            .fetch_one(conn)
            .await
    }

    pub async fn find_owned(
        conn: &mut PgConnection,
        id: i64,
        owner: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM comments WHERE id = $1 AND user_id = $2",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(conn)
            .await
    }

    /// Lists the comments `owner` left on one task
    pub async fn list_by_task(
        conn: &mut PgConnection,
        task_id: i64,
        owner: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM comments WHERE task_id = $1 AND user_id = $2 ORDER BY id",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(task_id)
            .bind(owner)
            .fetch_all(conn)
            .await
    }

    pub async fn update_owned(
        conn: &mut PgConnection,
        id: i64,
        owner: i64,
        data: UpdateComment,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE comments
            SET content = COALESCE($3, content),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(owner)
            .bind(data.content)
            .fetch_optional(conn)
            .await
    }

    pub async fn delete_owned(
        conn: &mut PgConnection,
        id: i64,
        owner: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "DELETE FROM comments WHERE id = $1 AND user_id = $2 RETURNING {}",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(conn)
            .await
    }
}
