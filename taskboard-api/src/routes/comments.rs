/// Comment endpoints
///
/// The create path keeps its historical spelling (`creat-comment`) so
/// existing clients continue to work.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{
    auth::guard::Principal,
    managers::{CommentDraft, CommentPatch},
    models::comment::Comment,
};

use crate::{app::AppState, error::ApiResult};

/// `POST /comment/creat-comment/`
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CommentDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let Json(draft) = payload?;
    let comment = state.comments.create(&principal, draft).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /comment/detail/:id`
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Comment>> {
    let Path(id) = path?;
    Ok(Json(state.comments.get(&principal, id).await?))
}

/// `GET /comment/:task_id` - the caller's comments on one task
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Comment>>> {
    let Path(task_id) = path?;
    Ok(Json(state.comments.list(&principal, task_id).await?))
}

/// `PUT /comment/edit-comment/:id`
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CommentPatch>, JsonRejection>,
) -> ApiResult<Json<Comment>> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.comments.update(&principal, id, patch).await?))
}

/// `DELETE /comment/delete-comment/:id`
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Comment>> {
    let Path(id) = path?;
    Ok(Json(state.comments.delete(&principal, id).await?))
}
