/// Postgres-backed [`Store`]
///
/// Reads borrow one pooled connection for the duration of the call. Every
/// mutation runs in its own transaction: committed when the statement
/// succeeds, rolled back before the error is returned when it fails.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::store::{PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let projects = store.list_projects(1).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use super::{Store, StoreError, StoreResult};
use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();

            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }

        StoreError::Backend(err.to_string())
    }
}

/// Store backed by a sqlx Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> StoreResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }
}

/// Commits on success; on failure rolls back first, then surfaces the error
async fn finish<T>(
    tx: Transaction<'static, Postgres>,
    result: Result<T, sqlx::Error>,
    operation: &'static str,
) -> StoreResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            warn!(operation, error = %err, "Rolling back transaction");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(operation, error = %rollback_err, "Rollback failed");
            }
            Err(err.into())
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tx = self.begin().await?;
        let result = User::create(&mut *tx, data).await;
        finish(tx, result, "create_user").await
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        Ok(User::find_by_id(&mut *conn, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        Ok(User::find_by_username(&mut *conn, username).await?)
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut tx = self.begin().await?;
        let result = User::update(&mut *tx, id, data).await;
        finish(tx, result, "update_user").await
    }

    async fn record_login(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.begin().await?;
        let result = User::update_last_login(&mut *tx, id).await;
        finish(tx, result, "record_login").await
    }

    async fn delete_user(&self, id: i64) -> StoreResult<Option<User>> {
        let mut tx = self.begin().await?;
        let result = User::delete(&mut *tx, id).await;
        finish(tx, result, "delete_user").await
    }

    async fn list_projects(&self, owner: i64) -> StoreResult<Vec<Project>> {
        let mut conn = self.pool.acquire().await?;
        let projects = Project::list_by_user(&mut *conn, owner).await?;
        debug!(owner, count = projects.len(), "Listed projects");
        Ok(projects)
    }

    async fn find_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Project::find_owned(&mut *conn, id, owner).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let mut tx = self.begin().await?;
        let result = Project::create(&mut *tx, data).await;
        finish(tx, result, "create_project").await
    }

    async fn update_project(
        &self,
        id: i64,
        owner: i64,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut tx = self.begin().await?;
        let result = Project::update_owned(&mut *tx, id, owner, data).await;
        finish(tx, result, "update_project").await
    }

    async fn delete_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>> {
        let mut tx = self.begin().await?;
        let result = Project::delete_owned(&mut *tx, id, owner).await;
        finish(tx, result, "delete_project").await
    }

    async fn list_tasks(&self, owner: i64) -> StoreResult<Vec<Task>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Task::list_by_user(&mut *conn, owner).await?)
    }

    async fn list_project_tasks(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Task::list_by_project(&mut *conn, project_id).await?)
    }

    async fn find_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Task::find_owned(&mut *conn, id, owner).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tx = self.begin().await?;
        let result = Task::create(&mut *tx, data).await;
        finish(tx, result, "create_task").await
    }

    async fn update_task(&self, id: i64, owner: i64, data: UpdateTask) -> StoreResult<Option<Task>> {
        let mut tx = self.begin().await?;
        let result = Task::update_owned(&mut *tx, id, owner, data).await;
        finish(tx, result, "update_task").await
    }

    async fn delete_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>> {
        let mut tx = self.begin().await?;
        let result = Task::delete_owned(&mut *tx, id, owner).await;
        finish(tx, result, "delete_task").await
    }

    async fn list_comments(&self, task_id: i64, owner: i64) -> StoreResult<Vec<Comment>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Comment::list_by_task(&mut *conn, task_id, owner).await?)
    }

    async fn find_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Comment::find_owned(&mut *conn, id, owner).await?)
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        let mut tx = self.begin().await?;
        let result = Comment::create(&mut *tx, data).await;
        finish(tx, result, "create_comment").await
    }

    async fn update_comment(
        &self,
        id: i64,
        owner: i64,
        data: UpdateComment,
    ) -> StoreResult<Option<Comment>> {
        let mut tx = self.begin().await?;
        let result = Comment::update_owned(&mut *tx, id, owner, data).await;
        finish(tx, result, "update_comment").await
    }

    async fn delete_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>> {
        let mut tx = self.begin().await?;
        let result = Comment::delete_owned(&mut *tx, id, owner).await;
        finish(tx, result, "delete_comment").await
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::db::pool::health_check(&self.pool).await?)
    }
}
