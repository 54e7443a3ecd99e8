/// Authentication endpoints
///
/// - `POST /auth/register-user` - Register a new user (JSON)
/// - `POST /auth/login-user` - Login and get tokens (form-encoded)
///
/// There is no refresh endpoint; the refresh token is issued for clients
/// that manage their own renewal.

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    http::StatusCode,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{managers::Registration, models::user::User};

use crate::{app::AppState, error::ApiResult};

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,

    /// Access token (scope `access_token`)
    pub access_token: String,

    /// Refresh token (scope `refresh_token`)
    pub refresh_token: String,

    /// Always `bearer`
    pub token_type: String,
}

/// Register a new user
///
/// ```text
/// POST /auth/register-user
/// Content-Type: application/json
///
/// { "username": "alice", "email": "alice@example.com", "password": "p1" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or validation failed
/// - `409 Conflict`: Username or email already exists
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(registration) = payload?;
    let user = state.accounts.register(registration).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with username and password
///
/// ```text
/// POST /auth/login-user
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice&password=p1
/// ```
///
/// Answers `202 Accepted` with the user and a token pair.
///
/// # Errors
///
/// - `404 Not Found`: Unknown user or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let Form(form) = form?;
    let outcome = state.accounts.login(&form.username, &form.password).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(LoginResponse {
            user: outcome.user,
            access_token: outcome.tokens.access_token,
            refresh_token: outcome.tokens.refresh_token,
            token_type: "bearer".to_string(),
        }),
    ))
}
