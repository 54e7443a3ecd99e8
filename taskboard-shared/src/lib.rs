//! # Taskboard Shared Library
//!
//! Domain types, persistence and business logic used by the Taskboard API
//! server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, token service, authenticator and request guard
//! - `db`: Connection pool and migrations
//! - `error`: Domain error taxonomy returned by every manager operation
//! - `managers`: Ownership-scoped operations over accounts, projects, tasks,
//!   comments and profiles
//! - `models`: Entity structs and their SQL
//! - `storage`: Profile image storage
//! - `store`: Persistence seam (`Store` trait) with Postgres and in-memory
//!   implementations

pub mod auth;
pub mod db;
pub mod error;
pub mod managers;
pub mod models;
pub mod storage;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
