//! Shared types, errors, and configuration for Ledgerline.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error taxonomy
//! - Request context (actor, cancellation, deadline)
//! - Typed IDs and offset pagination with opaque tokens
//! - Configuration management

pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use context::RequestContext;
pub use error::{AppError, AppResult};
