/// The principal's own account: view, edit (with optional image) and delete
///
/// The record edited is always the one named by the token's user id, never a
/// caller-supplied id.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use validator::Validate;

use crate::auth::guard::Principal;
use crate::error::{BoardError, BoardResult};
use crate::models::user::{UpdateUser, User};
use crate::storage::{ImageStore, StagedImage};
use crate::store::Store;

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,

    /// Declared MIME type; must start with `image/`
    pub content_type: String,

    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, Validate)]
pub struct ProfileEdit {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    pub image: Option<ImageUpload>,
}

#[derive(Clone)]
pub struct ProfileManager {
    store: Arc<dyn Store>,
    images: Arc<dyn ImageStore>,
}

impl ProfileManager {
    pub fn new(store: Arc<dyn Store>, images: Arc<dyn ImageStore>) -> Self {
        Self { store, images }
    }

    pub async fn profile(&self, principal: &Principal) -> BoardResult<User> {
        self.store
            .find_user_by_id(principal.id)
            .await?
            .ok_or(BoardError::NotFound("User"))
    }

    /// Updates username and email, recording a new image when one is given
    ///
    /// The image is staged before the row update and only moved into place
    /// after it succeeds, so a rejected edit leaves the current image as it
    /// was.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed fields, a non-image upload or an unusable
    ///   file name
    /// - `Conflict` when the new username or email belongs to someone else
    /// - `NotFound` when the account no longer exists
    pub async fn edit_profile(&self, principal: &Principal, edit: ProfileEdit) -> BoardResult<User> {
        edit.validate()?;
        let user = self.profile(principal).await?;

        let staged = match edit.image {
            Some(upload) => {
                if !upload.is_image() {
                    return Err(BoardError::invalid("profile_image", "File must be an image"));
                }
                Some(self.images.stage(user.id, &upload.filename, &upload.bytes).await?)
            }
            None => None,
        };

        let result = self
            .store
            .update_user(
                user.id,
                UpdateUser {
                    username: Some(edit.username),
                    email: Some(edit.email),
                    profile_image: staged.as_ref().map(StagedImage::path),
                },
            )
            .await
            .map_err(BoardError::from)
            .and_then(|updated| updated.ok_or(BoardError::NotFound("User")));

        let updated = match result {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(staged) = staged {
                    self.images.discard(staged).await;
                }
                return Err(err);
            }
        };

        if let Some(staged) = staged {
            self.images.commit(staged).await?;
        }

        info!(user_id = user.id, image = updated.profile_image.is_some(), "Profile updated");
        Ok(updated)
    }

    /// Deletes the principal's account and everything it owns
    pub async fn delete_account(&self, principal: &Principal) -> BoardResult<User> {
        let user = self
            .store
            .delete_user(principal.id)
            .await?
            .ok_or(BoardError::NotFound("User"))?;

        info!(user_id = user.id, "Account deleted");
        Ok(user)
    }
}
