/// Resource managers
///
/// Every operation takes the acting [`Principal`](crate::auth::guard::Principal)
/// resolved from the request's access token and never a caller-supplied owner
/// id. Ownership protocol shared by projects, tasks and comments:
///
/// | Operation | Behavior |
/// |-----------|----------|
/// | list      | Records owned by the principal |
/// | get       | By id and owner; otherwise `NotFound` |
/// | create    | Validate, stamp owner from principal, persist |
/// | update    | By id and owner; only supplied fields change |
/// | delete    | By id and owner; cascades; returns the prior state |
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::auth::guard::Principal;
/// use taskboard_shared::managers::{ProjectDraft, ProjectManager};
/// use taskboard_shared::models::user::CreateUser;
/// use taskboard_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let alice = store
///     .create_user(CreateUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         password_hash: None,
///     })
///     .await?;
///
/// let projects = ProjectManager::new(store);
/// let principal = Principal::new(alice.username, alice.id);
/// let project = projects
///     .create(&principal, ProjectDraft { name: "P".to_string(), description: None })
///     .await?;
/// assert_eq!(project.user_id, principal.id);
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod comment;
pub mod profile;
pub mod project;
pub mod task;

pub use account::{AccountManager, LoginOutcome, Registration};
pub use comment::{CommentDraft, CommentManager, CommentPatch};
pub use profile::{ImageUpload, ProfileEdit, ProfileManager};
pub use project::{ProjectDraft, ProjectManager, ProjectPatch};
pub use task::{TaskDraft, TaskManager, TaskPatch};
