/// In-memory [`Store`]
///
/// Mirrors the Postgres schema's constraints so managers behave the same
/// against either backend:
///
/// - `users_username_key` / `users_email_key` unique constraints
/// - Foreign keys from projects, tasks and comments to their parents
/// - `ON DELETE CASCADE` on every edge, applied transitively
///
/// All tables sit behind one mutex, so every operation is atomic. Ids are
/// assigned from per-table counters starting at 1.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::user::CreateUser;
/// use taskboard_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store
///     .create_user(CreateUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         password_hash: None,
///     })
///     .await?;
/// assert_eq!(user.id, 1);
/// # Ok(())
/// # }
/// ```

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Store, StoreError, StoreResult};
use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    projects: BTreeMap<i64, Project>,
    tasks: BTreeMap<i64, Task>,
    comments: BTreeMap<i64, Comment>,
    next_user: i64,
    next_project: i64,
    next_task: i64,
    next_comment: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn fk(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation(constraint.to_string())
}

impl Tables {
    fn check_unique_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<i64>,
    ) -> StoreResult<()> {
        for user in self.users.values().filter(|u| Some(u.id) != except) {
            if username == Some(user.username.as_str()) {
                return Err(StoreError::UniqueViolation("users_username_key".to_string()));
            }
            if email == Some(user.email.as_str()) {
                return Err(StoreError::UniqueViolation("users_email_key".to_string()));
            }
        }
        Ok(())
    }

    /// Removes tasks matching `doomed` together with their comments
    fn cascade_tasks(&mut self, doomed: impl Fn(&Task) -> bool) {
        let task_ids: HashSet<i64> = self
            .tasks
            .values()
            .filter(|t| doomed(t))
            .map(|t| t.id)
            .collect();

        self.tasks.retain(|id, _| !task_ids.contains(id));
        self.comments.retain(|_, c| !task_ids.contains(&c.task_id));
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        tables.check_unique_user(Some(&data.username), Some(&data.email), None)?;

        let user = User {
            id: next_id(&mut tables.next_user),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            profile_image: None,
            is_active: true,
            last_login: None,
            role: None,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        tables.check_unique_user(data.username.as_deref(), data.email.as_deref(), Some(id))?;

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = data.username {
            user.username = username;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(profile_image) = data.profile_image {
            user.profile_image = Some(profile_image);
        }
        Ok(Some(user.clone()))
    }

    async fn record_login(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.last_login = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: i64) -> StoreResult<Option<User>> {
        let mut tables = self.tables.lock().await;
        let Some(user) = tables.users.remove(&id) else {
            return Ok(None);
        };

        let project_ids: HashSet<i64> = tables
            .projects
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        tables.projects.retain(|pid, _| !project_ids.contains(pid));
        tables.cascade_tasks(|t| t.user_id == id || project_ids.contains(&t.project_id));
        tables.comments.retain(|_, c| c.user_id != id);

        Ok(Some(user))
    }

    async fn list_projects(&self, owner: i64) -> StoreResult<Vec<Project>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .projects
            .get(&id)
            .filter(|p| p.user_id == owner)
            .cloned())
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&data.user_id) {
            return Err(fk("projects_user_id_fkey"));
        }

        let now = Utc::now();
        let project = Project {
            id: next_id(&mut tables.next_project),
            name: data.name,
            description: data.description,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: i64,
        owner: i64,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.lock().await;
        let Some(project) = tables.projects.get_mut(&id).filter(|p| p.user_id == owner) else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            project.name = name;
        }
        if let Some(description) = data.description {
            project.description = description;
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.lock().await;
        if !tables.projects.get(&id).is_some_and(|p| p.user_id == owner) {
            return Ok(None);
        }

        let project = tables.projects.remove(&id);
        tables.cascade_tasks(|t| t.project_id == id);
        Ok(project)
    }

    async fn list_tasks(&self, owner: i64) -> StoreResult<Vec<Task>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect())
    }

    async fn list_project_tasks(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>> {
        let tables = self.tables.lock().await;
        Ok(tables.tasks.get(&id).filter(|t| t.user_id == owner).cloned())
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.lock().await;
        if !tables.projects.contains_key(&data.project_id) {
            return Err(fk("tasks_project_id_fkey"));
        }
        if !tables.users.contains_key(&data.user_id) {
            return Err(fk("tasks_user_id_fkey"));
        }

        let now = Utc::now();
        let task = Task {
            id: next_id(&mut tables.next_task),
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            deadline: data.deadline,
            project_id: data.project_id,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: i64, owner: i64, data: UpdateTask) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.lock().await;
        if !tables.tasks.get(&id).is_some_and(|t| t.user_id == owner) {
            return Ok(None);
        }
        if let Some(project_id) = data.project_id {
            if !tables.projects.contains_key(&project_id) {
                return Err(fk("tasks_project_id_fkey"));
            }
        }

        let Some(task) = tables.tasks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = data.title {
            task.title = title;
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(status) = data.status {
            task.status = status;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        if let Some(deadline) = data.deadline {
            task.deadline = deadline;
        }
        if let Some(project_id) = data.project_id {
            task.project_id = project_id;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.lock().await;
        if !tables.tasks.get(&id).is_some_and(|t| t.user_id == owner) {
            return Ok(None);
        }

        let task = tables.tasks.remove(&id);
        tables.comments.retain(|_, c| c.task_id != id);
        Ok(task)
    }

    async fn list_comments(&self, task_id: i64, owner: i64) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.task_id == task_id && c.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>> {
        let tables = self.tables.lock().await;
        Ok(tables.comments.get(&id).filter(|c| c.user_id == owner).cloned())
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        let mut tables = self.tables.lock().await;
        if !tables.tasks.contains_key(&data.task_id) {
            return Err(fk("comments_task_id_fkey"));
        }
        if !tables.users.contains_key(&data.user_id) {
            return Err(fk("comments_user_id_fkey"));
        }

        let now = Utc::now();
        let comment = Comment {
            id: next_id(&mut tables.next_comment),
            content: data.content,
            task_id: data.task_id,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: i64,
        owner: i64,
        data: UpdateComment,
    ) -> StoreResult<Option<Comment>> {
        let mut tables = self.tables.lock().await;
        let Some(comment) = tables.comments.get_mut(&id).filter(|c| c.user_id == owner) else {
            return Ok(None);
        };

        if let Some(content) = data.content {
            comment.content = Some(content);
        }
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>> {
        let mut tables = self.tables.lock().await;
        if !tables.comments.get(&id).is_some_and(|c| c.user_id == owner) {
            return Ok(None);
        }
        Ok(tables.comments.remove(&id))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
