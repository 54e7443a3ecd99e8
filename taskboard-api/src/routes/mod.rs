/// API route handlers
///
/// Handlers are thin: extract, call one manager operation, pick the success
/// status. Failures convert through `ApiError`.
///
/// - `health`: Liveness and store connectivity
/// - `auth`: Registration and login
/// - `projects`: Project CRUD plus the cross-user project/task listings
/// - `tasks`: Task CRUD
/// - `comments`: Comment CRUD
/// - `users`: Own profile view, edit (multipart) and account deletion

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
