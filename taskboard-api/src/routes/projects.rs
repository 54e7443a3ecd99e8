/// Project endpoints
///
/// All routes require an access token. Single-project routes only see the
/// caller's own projects; `GET /project/user/:user_id` and
/// `GET /project/:id/tasks` are open to any authenticated caller.

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
    managers::{ProjectDraft, ProjectPatch},
    models::{project::Project, task::Task},
};

use crate::{app::AppState, error::ApiResult};

/// `GET /project/`
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.projects.list(&principal).await?))
}

/// `GET /project/user/` - same as `/project/`
pub async fn list_my_projects(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.projects.list_for_user(principal.id).await?))
}

/// `GET /project/user/:user_id` - projects of any user
pub async fn list_user_projects(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Project>>> {
    let Path(user_id) = path?;
    Ok(Json(state.projects.list_for_user(user_id).await?))
}

/// `GET /project/:id`
pub async fn get_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = path?;
    Ok(Json(state.projects.get(&principal, id).await?))
}

/// `GET /project/:id/tasks` - every task in the project, whoever owns it
pub async fn list_project_tasks(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(id) = path?;
    Ok(Json(state.projects.project_tasks(id).await?))
}

/// `POST /project/create`
///
/// ```json
/// { "name": "Website", "description": "optional" }
/// ```
pub async fn create_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<ProjectDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let Json(draft) = payload?;
    let project = state.projects.create(&principal, draft).await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// `PUT /project/edit-project/:id` - only supplied fields change
pub async fn update_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProjectPatch>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.projects.update(&principal, id, patch).await?))
}

/// `DELETE /project/delete-project/:id` - returns the deleted project
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = path?;
    Ok(Json(state.projects.delete(&principal, id).await?))
}
