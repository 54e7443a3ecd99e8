/// Task operations
///
/// Status and priority arrive as strings and are parsed here, so an unknown
/// value becomes a field-level `Validation` error instead of a body
/// deserialization failure.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::guard::Principal;
use crate::error::{BoardError, BoardResult};
use crate::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UnknownVariant, UpdateTask};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskDraft {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    /// Defaults to `todo`
    pub status: Option<String>,

    /// Defaults to `low`
    pub priority: Option<String>,

    pub deadline: DateTime<Utc>,
    pub project_id: i64,
}

/// Partial update; the owner is not part of it
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub project_id: Option<i64>,
}

/// Parses an optional enumeration value, naming `field` on failure
fn parse_field<T>(field: &'static str, value: Option<&str>) -> BoardResult<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .map(|s| s.parse::<T>().map_err(|e| BoardError::invalid(field, e.to_string())))
        .transpose()
}

#[derive(Clone)]
pub struct TaskManager {
    store: Arc<dyn Store>,
}

impl TaskManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, principal: &Principal) -> BoardResult<Vec<Task>> {
        let tasks = self.store.list_tasks(principal.id).await?;
        debug!(user_id = principal.id, count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Tasks of `user_id` visible to the principal: their own, or nothing
    pub async fn list_for_user(&self, principal: &Principal, user_id: i64) -> BoardResult<Vec<Task>> {
        if user_id != principal.id {
            debug!(user_id, principal_id = principal.id, "Foreign task list requested");
            return Ok(Vec::new());
        }
        self.list(principal).await
    }

    pub async fn get(&self, principal: &Principal, id: i64) -> BoardResult<Task> {
        self.store
            .find_task(id, principal.id)
            .await?
            .ok_or(BoardError::NotFound("Task"))
    }

    /// Creates a task owned by the principal
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty title or unknown status/priority
    /// - `Internal` when `project_id` names no project
    pub async fn create(&self, principal: &Principal, draft: TaskDraft) -> BoardResult<Task> {
        draft.validate()?;
        let status = parse_field::<TaskStatus>("status", draft.status.as_deref())?
            .unwrap_or_default();
        let priority = parse_field::<TaskPriority>("priority", draft.priority.as_deref())?
            .unwrap_or_default();

        let task = self
            .store
            .create_task(CreateTask {
                title: draft.title,
                description: draft.description.unwrap_or_default(),
                status,
                priority,
                deadline: draft.deadline,
                project_id: draft.project_id,
                user_id: principal.id,
            })
            .await?;

        info!(
            task_id = task.id,
            project_id = task.project_id,
            user_id = principal.id,
            "Task created"
        );
        Ok(task)
    }

    pub async fn update(&self, principal: &Principal, id: i64, patch: TaskPatch) -> BoardResult<Task> {
        patch.validate()?;
        let status = parse_field("status", patch.status.as_deref())?;
        let priority = parse_field("priority", patch.priority.as_deref())?;

        let task = self
            .store
            .update_task(
                id,
                principal.id,
                UpdateTask {
                    title: patch.title,
                    description: patch.description,
                    status,
                    priority,
                    deadline: patch.deadline,
                    project_id: patch.project_id,
                },
            )
            .await?
            .ok_or(BoardError::NotFound("Task"))?;

        info!(task_id = id, user_id = principal.id, "Task updated");
        Ok(task)
    }

    /// Deletes a task with its comments, returning its prior state
    pub async fn delete(&self, principal: &Principal, id: i64) -> BoardResult<Task> {
        let task = self
            .store
            .delete_task(id, principal.id)
            .await?
            .ok_or(BoardError::NotFound("Task"))?;

        info!(task_id = id, user_id = principal.id, "Task deleted");
        Ok(task)
    }
}
