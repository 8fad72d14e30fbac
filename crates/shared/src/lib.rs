//! Shared types, errors, and configuration for Vendra.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - Tenant-context claims and JWT validation
//! - Invoice email dispatch
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::TenantContext;
pub use config::AppConfig;
pub use email::EmailService;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
