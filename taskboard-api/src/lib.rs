//! # Taskboard API Server Library
//!
//! HTTP surface of the task board: routing, authentication layer, error
//! mapping and configuration. Business rules live in `taskboard-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
