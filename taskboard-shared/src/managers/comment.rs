/// Comment operations

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::auth::guard::Principal;
use crate::error::{BoardError, BoardResult};
use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentDraft {
    #[validate(length(max = 10000, message = "Comment must be at most 10000 characters"))]
    pub content: Option<String>,
    pub task_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentPatch {
    #[validate(length(max = 10000, message = "Comment must be at most 10000 characters"))]
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct CommentManager {
    store: Arc<dyn Store>,
}

impl CommentManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The principal's comments on one task
    pub async fn list(&self, principal: &Principal, task_id: i64) -> BoardResult<Vec<Comment>> {
        Ok(self.store.list_comments(task_id, principal.id).await?)
    }

    pub async fn get(&self, principal: &Principal, id: i64) -> BoardResult<Comment> {
        self.store
            .find_comment(id, principal.id)
            .await?
            .ok_or(BoardError::NotFound("Comment"))
    }

    /// Comments on a task that does not exist fail as `Internal`
    pub async fn create(&self, principal: &Principal, draft: CommentDraft) -> BoardResult<Comment> {
        draft.validate()?;

        let comment = self
            .store
            .create_comment(CreateComment {
                content: draft.content,
                task_id: draft.task_id,
                user_id: principal.id,
            })
            .await?;

        info!(
            comment_id = comment.id,
            task_id = comment.task_id,
            user_id = principal.id,
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: CommentPatch,
    ) -> BoardResult<Comment> {
        patch.validate()?;

        let comment = self
            .store
            .update_comment(id, principal.id, UpdateComment { content: patch.content })
            .await?
            .ok_or(BoardError::NotFound("Comment"))?;

        info!(comment_id = id, user_id = principal.id, "Comment updated");
        Ok(comment)
    }

    pub async fn delete(&self, principal: &Principal, id: i64) -> BoardResult<Comment> {
        let comment = self
            .store
            .delete_comment(id, principal.id)
            .await?
            .ok_or(BoardError::NotFound("Comment"))?;

        info!(comment_id = id, user_id = principal.id, "Comment deleted");
        Ok(comment)
    }
}
