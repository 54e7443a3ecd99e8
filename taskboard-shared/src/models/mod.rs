/// Database models for Taskboard
///
/// Each model owns its SQL. Functions take a `&mut PgConnection` so the same
/// query runs on a pooled connection or inside a transaction.
///
/// # Models
///
/// - `user`: Accounts and credentials
/// - `project`: Top-level containers owned by a user
/// - `task`: Work items inside a project
/// - `comment`: Notes attached to a task
///
/// Ownership: User → Projects → Tasks → Comments, with `ON DELETE CASCADE` at
/// every edge. Tasks and comments also reference their owning user directly.

pub mod comment;
pub mod project;
pub mod task;
pub mod user;
