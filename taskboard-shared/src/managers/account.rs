/// Registration and login
///
/// Login failure never says whether the username or the password was wrong;
/// both surface as `BoardError::InvalidCredentials`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::authenticator::authenticate;
use crate::auth::jwt::{TokenPair, TokenService};
use crate::auth::password::hash_password;
use crate::error::{BoardError, BoardResult};
use crate::models::user::{CreateUser, User};
use crate::store::Store;

/// Registration request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: User,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AccountManager {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
}

impl AccountManager {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Creates an account; only the Argon2id hash of the password is stored
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed fields
    /// - `Conflict` when the username or email is taken
    pub async fn register(&self, registration: Registration) -> BoardResult<User> {
        registration.validate()?;

        let password_hash = hash_password(&registration.password)?;
        let user = self
            .store
            .create_user(CreateUser {
                username: registration.username,
                email: registration.email,
                password_hash: Some(password_hash),
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues an access/refresh token pair
    pub async fn login(&self, username: &str, password: &str) -> BoardResult<LoginOutcome> {
        let Some(user) = authenticate(self.store.as_ref(), username, password).await? else {
            warn!(username, "Login rejected");
            return Err(BoardError::InvalidCredentials);
        };

        // The account may have been deleted since it was authenticated
        if !self.store.record_login(user.id).await? {
            warn!(user_id = user.id, "Login rejected, account no longer exists");
            return Err(BoardError::InvalidCredentials);
        }
        let tokens = self.tokens.issue_pair(&user.username, user.id)?;

        info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome { user, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenScope;
    use crate::auth::password::verify_password;
    use crate::models::comment::{Comment, CreateComment, UpdateComment};
    use crate::models::project::{CreateProject, Project, UpdateProject};
    use crate::models::task::{CreateTask, Task, UpdateTask};
    use crate::models::user::UpdateUser;
    use crate::store::{MemoryStore, StoreResult};
    use jsonwebtoken::Algorithm;

    fn manager() -> (AccountManager, Arc<dyn Store>, Arc<TokenService>) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let tokens = Arc::new(
            TokenService::new("test-secret-key-at-least-32-bytes-long", Algorithm::HS256).unwrap(),
        );
        (AccountManager::new(store.clone(), tokens.clone()), store, tokens)
    }

    fn registration(username: &str, password: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let (accounts, store, _) = manager();

        let user = accounts.register(registration("alice", "p1")).await.unwrap();

        let stored = store.find_user_by_id(user.id).await.unwrap().unwrap();
        let hash = stored.password_hash.unwrap();
        assert_ne!(hash, "p1");
        assert!(verify_password("p1", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (accounts, _, _) = manager();
        accounts.register(registration("alice", "p1")).await.unwrap();

        let mut again = registration("alice", "p2");
        again.email = "other@example.com".to_string();
        let err = accounts.register(again).await.unwrap_err();
        assert!(matches!(err, BoardError::Conflict(ref m) if m == "Username already exists"));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let (accounts, _, _) = manager();
        let mut bad = registration("alice", "p1");
        bad.email = "not-an-email".to_string();

        match accounts.register(bad).await.unwrap_err() {
            BoardError::Validation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "email");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_issues_scoped_tokens() {
        let (accounts, store, tokens) = manager();
        let user = accounts.register(registration("alice", "p1")).await.unwrap();

        let outcome = accounts.login("alice", "p1").await.unwrap();
        assert_eq!(outcome.user.id, user.id);

        let access = tokens
            .validate(&outcome.tokens.access_token, TokenScope::AccessToken)
            .unwrap();
        assert_eq!(access.sub, "alice");
        assert_eq!(access.id, user.id);

        let refresh = tokens
            .validate(&outcome.tokens.refresh_token, TokenScope::RefreshToken)
            .unwrap();
        assert_eq!(refresh.id, user.id);
        assert!(refresh.exp > access.exp);

        let stored = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (accounts, _, _) = manager();
        accounts.register(registration("alice", "p1")).await.unwrap();

        assert!(matches!(
            accounts.login("alice", "wrong").await,
            Err(BoardError::InvalidCredentials)
        ));
        assert!(matches!(
            accounts.login("nobody", "p1").await,
            Err(BoardError::InvalidCredentials)
        ));
    }

    /// Deletes the account just before the login is recorded
    struct VanishingStore {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl Store for VanishingStore {
        async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
            self.inner.create_user(data).await
        }

        async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
            self.inner.find_user_by_id(id).await
        }

        async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
            self.inner.find_user_by_username(username).await
        }

        async fn update_user(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>> {
            self.inner.update_user(id, data).await
        }

        async fn record_login(&self, id: i64) -> StoreResult<bool> {
            self.inner.delete_user(id).await?;
            self.inner.record_login(id).await
        }

        async fn delete_user(&self, id: i64) -> StoreResult<Option<User>> {
            self.inner.delete_user(id).await
        }

        async fn list_projects(&self, owner: i64) -> StoreResult<Vec<Project>> {
            self.inner.list_projects(owner).await
        }

        async fn find_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>> {
            self.inner.find_project(id, owner).await
        }

        async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
            self.inner.create_project(data).await
        }

        async fn update_project(
            &self,
            id: i64,
            owner: i64,
            data: UpdateProject,
        ) -> StoreResult<Option<Project>> {
            self.inner.update_project(id, owner, data).await
        }

        async fn delete_project(&self, id: i64, owner: i64) -> StoreResult<Option<Project>> {
            self.inner.delete_project(id, owner).await
        }

        async fn list_tasks(&self, owner: i64) -> StoreResult<Vec<Task>> {
            self.inner.list_tasks(owner).await
        }

        async fn list_project_tasks(&self, project_id: i64) -> StoreResult<Vec<Task>> {
            self.inner.list_project_tasks(project_id).await
        }

        async fn find_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>> {
            self.inner.find_task(id, owner).await
        }

        async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
            self.inner.create_task(data).await
        }

        async fn update_task(
            &self,
            id: i64,
            owner: i64,
            data: UpdateTask,
        ) -> StoreResult<Option<Task>> {
            self.inner.update_task(id, owner, data).await
        }

        async fn delete_task(&self, id: i64, owner: i64) -> StoreResult<Option<Task>> {
            self.inner.delete_task(id, owner).await
        }

        async fn list_comments(&self, task_id: i64, owner: i64) -> StoreResult<Vec<Comment>> {
            self.inner.list_comments(task_id, owner).await
        }

        async fn find_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>> {
            self.inner.find_comment(id, owner).await
        }

        async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
            self.inner.create_comment(data).await
        }

        async fn update_comment(
            &self,
            id: i64,
            owner: i64,
            data: UpdateComment,
        ) -> StoreResult<Option<Comment>> {
            self.inner.update_comment(id, owner, data).await
        }

        async fn delete_comment(&self, id: i64, owner: i64) -> StoreResult<Option<Comment>> {
            self.inner.delete_comment(id, owner).await
        }

        async fn ping(&self) -> StoreResult<()> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_login_rejected_when_account_vanishes() {
        let store: Arc<dyn Store> = Arc::new(VanishingStore {
            inner: MemoryStore::new(),
        });
        let tokens = Arc::new(
            TokenService::new("test-secret-key-at-least-32-bytes-long", Algorithm::HS256).unwrap(),
        );
        let accounts = AccountManager::new(store.clone(), tokens);
        accounts.register(registration("alice", "p1")).await.unwrap();

        assert!(matches!(
            accounts.login("alice", "p1").await,
            Err(BoardError::InvalidCredentials)
        ));
        assert!(store.find_user_by_username("alice").await.unwrap().is_none());
    }
}
