/// Task endpoints
///
/// Every route is scoped to the caller's own tasks. `status` and `priority`
/// arrive as strings and are rejected with `400` unless they name a known
/// variant.

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
    managers::{TaskDraft, TaskPatch},
    models::task::Task,
};

use crate::{app::AppState, error::ApiResult};

/// `GET /tasks/`
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list(&principal).await?))
}

/// `GET /tasks/user/:user_id`
///
/// Empty unless `user_id` is the caller's own id.
pub async fn list_user_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(user_id) = path?;
    Ok(Json(state.tasks.list_for_user(&principal, user_id).await?))
}

/// `GET /tasks/:id`
pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    Ok(Json(state.tasks.get(&principal, id).await?))
}

/// `POST /tasks/create-task`
///
/// ```json
/// {
///   "title": "Ship it",
///   "description": "",
///   "status": "todo",
///   "priority": "high",
///   "deadline": "2026-01-01T00:00:00Z",
///   "project_id": 1
/// }
/// ```
///
/// The project must belong to the caller, otherwise `404`.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(draft) = payload?;
    let task = state.tasks.create(&principal, draft).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /tasks/update-task/:id`
pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.tasks.update(&principal, id, patch).await?))
}

/// `DELETE /tasks/delete-task/:id`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    Ok(Json(state.tasks.delete(&principal, id).await?))
}
