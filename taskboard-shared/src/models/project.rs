/// Project model and database operations
///
/// Every query except [`Project::list_by_user`] is scoped by owner, so a
/// project belonging to somebody else looks exactly like a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

const PROJECT_COLUMNS: &str = "id, name, description, user_id, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,

    /// Owner; immutable after creation
    pub user_id: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub user_id: i64,
}

/// Input for updating a project; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Project {
    pub async fn create(conn: &mut PgConnection, data: CreateProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, user_id) VALUES ($1, $2, $3) RETURNING {}",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.user_id)
            .fetch_one(conn)
            .await
    }

    /// Finds a project by id, visible only to its owner
    pub async fn find_owned(
        conn: &mut PgConnection,
        id: i64,
        owner: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(conn)
            .await
    }

    /// Lists every project owned by `user_id`, oldest first
    pub async fn list_by_user(conn: &mut PgConnection, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY id",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(conn)
            .await
    }

    pub async fn update_owned(
        conn: &mut PgConnection,
        id: i64,
        owner: i64,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE projects
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner)
            .bind(data.name)
            .bind(data.description)
            .fetch_optional(conn)
            .await
    }

    /// Deletes an owned project; its tasks and their comments go with it
    ///
    /// # Returns
    ///
    /// The deleted row, or `None` if the owner has no such project
    pub async fn delete_owned(
        conn: &mut PgConnection,
        id: i64,
        owner: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "DELETE FROM projects WHERE id = $1 AND user_id = $2 RETURNING {}",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(conn)
            .await
    }
}
