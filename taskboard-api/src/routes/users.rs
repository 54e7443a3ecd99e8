/// Account endpoints for the authenticated user
///
/// - `GET /user/me` - Current user
/// - `PUT /user/edit/` - Edit username/email, optionally upload a profile image
/// - `DELETE /user/delete/` - Delete the account and everything it owns

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Extension, Json,
};
use taskboard_shared::{
    auth::guard::Principal,
    error::BoardError,
    managers::{ImageUpload, ProfileEdit},
    models::user::User,
};

use crate::{app::AppState, error::ApiResult};

/// `GET /user/me`
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.profiles.profile(&principal).await?))
}

/// `PUT /user/edit/`
///
/// ```text
/// Content-Type: multipart/form-data
///
/// username=<text>
/// email=<text>
/// profile_image=<file, optional>
/// ```
///
/// An empty file part counts as no upload. The file part may also be named
/// `file`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, invalid email, or a non-image file
/// - `409 Conflict`: Username or email taken by another account
pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<User>> {
    let edit = read_profile_form(multipart?).await?;
    Ok(Json(state.profiles.edit_profile(&principal, edit).await?))
}

/// `DELETE /user/delete/` - returns the deleted user
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.profiles.delete_account(&principal).await?))
}

async fn read_profile_form(mut multipart: Multipart) -> ApiResult<ProfileEdit> {
    let mut username = None;
    let mut email = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "username" => username = Some(field.text().await?),
            "email" => email = Some(field.text().await?),
            "profile_image" | "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;

                if !bytes.is_empty() {
                    image = Some(ImageUpload {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let username = username.ok_or_else(|| BoardError::invalid("username", "Field required"))?;
    let email = email.ok_or_else(|| BoardError::invalid("email", "Field required"))?;

    Ok(ProfileEdit {
        username,
        email,
        image,
    })
}
