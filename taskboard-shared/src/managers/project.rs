/// Project operations
///
/// All mutations and single-record reads are scoped to the acting
/// principal. [`ProjectManager::list_for_user`] and
/// [`ProjectManager::project_tasks`] are read-only lookups that any
/// authenticated caller may run against any user or project.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::guard::Principal;
use crate::error::{BoardError, BoardResult};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::Task;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectDraft {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,
}

/// Partial update; absent fields are left as they are
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProjectPatch {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

#[derive(Clone)]
pub struct ProjectManager {
    store: Arc<dyn Store>,
}

impl ProjectManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, principal: &Principal) -> BoardResult<Vec<Project>> {
        self.list_for_user(principal.id).await
    }

    /// Projects owned by any user
    pub async fn list_for_user(&self, user_id: i64) -> BoardResult<Vec<Project>> {
        let projects = self.store.list_projects(user_id).await?;
        debug!(user_id, count = projects.len(), "Listed projects");
        Ok(projects)
    }

    pub async fn get(&self, principal: &Principal, id: i64) -> BoardResult<Project> {
        self.store
            .find_project(id, principal.id)
            .await?
            .ok_or(BoardError::NotFound("Project"))
    }

    pub async fn create(&self, principal: &Principal, draft: ProjectDraft) -> BoardResult<Project> {
        draft.validate()?;

        let project = self
            .store
            .create_project(CreateProject {
                name: draft.name,
                description: draft.description.unwrap_or_default(),
                user_id: principal.id,
            })
            .await?;

        info!(project_id = project.id, user_id = principal.id, "Project created");
        Ok(project)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: ProjectPatch,
    ) -> BoardResult<Project> {
        patch.validate()?;

        let project = self
            .store
            .update_project(
                id,
                principal.id,
                UpdateProject {
                    name: patch.name,
                    description: patch.description,
                },
            )
            .await?
            .ok_or(BoardError::NotFound("Project"))?;

        info!(project_id = id, user_id = principal.id, "Project updated");
        Ok(project)
    }

    /// Deletes a project with its tasks and their comments
    ///
    /// # Returns
    ///
    /// The project as it was before deletion
    pub async fn delete(&self, principal: &Principal, id: i64) -> BoardResult<Project> {
        let project = self
            .store
            .delete_project(id, principal.id)
            .await?
            .ok_or(BoardError::NotFound("Project"))?;

        info!(project_id = id, user_id = principal.id, "Project deleted");
        Ok(project)
    }

    /// Every task in a project, whoever owns the project or the tasks
    pub async fn project_tasks(&self, project_id: i64) -> BoardResult<Vec<Task>> {
        Ok(self.store.list_project_tasks(project_id).await?)
    }
}
