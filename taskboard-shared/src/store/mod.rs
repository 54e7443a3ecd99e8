/// Persistence seam
///
/// Managers talk to storage only through the [`Store`] trait, so the same
/// ownership rules run against Postgres in production and against memory in
/// tests.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx/Postgres. Reads use a pooled connection,
///   mutations run in a transaction that is rolled back on failure.
/// - [`memory::MemoryStore`]: In-process tables with the same unique,
///   foreign-key and cascade semantics as the schema.
///
/// # Contract
///
/// - Methods taking an `owner` only see rows whose `user_id` equals it.
///   A row owned by somebody else is reported exactly like a missing one.
/// - `update_*` and `delete_*` return `None` when nothing matched.
/// - `delete_*` returns the row as it was before deletion.
/// - Deletes cascade: user → projects/tasks/comments, project → tasks →
///   comments, task → comments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A referenced parent row does not exist; carries the constraint name
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Connection, protocol or query failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations used by the managers
#[async_trait]
pub trait Store: Send + Sync {
    // Users

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn update_user(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>>;

    /// Stamps the user's last-login time; false if the user is gone
    async fn record_login(&self, id: i64) -> StoreResult<bool>;

    async fn delete_user(&self, id: i64) -> StoreResult<Option<User>>;

    // Projects

    /// All projects owned by `owner`
    async fn list_projects(&self, owner: i64) -> StoreResult<Vec<Project>>;

    async fn find_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>>;

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    async fn update_project(
        &self,
        id: i64,
        owner: i64,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>>;

    async fn delete_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>>;

    // Tasks

    /// All tasks owned by `owner`, across projects
    async fn list_tasks(&self, owner: i64) -> StoreResult<Vec<Task>>;

    /// All tasks in a project, whoever owns them
    async fn list_project_tasks(&self, project_id: i64) -> StoreResult<Vec<Task>>;

    async fn find_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>>;

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn update_task(&self, id: i64, owner: i64, data: UpdateTask) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>>;

    // Comments

    /// Comments left by `owner` on one task
    async fn list_comments(&self, task_id: i64, owner: i64) -> StoreResult<Vec<Comment>>;

    async fn find_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>>;

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment>;

    async fn update_comment(
        &self,
        id: i64,
        owner: i64,
        data: UpdateComment,
    ) -> StoreResult<Option<Comment>>;

    async fn delete_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}
