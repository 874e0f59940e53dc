//! Shared types, errors, and configuration for the wallet service.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for wallets and audit records
//! - Application-wide error type with HTTP status mapping
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, ServerConfig, WalletConfig};
pub use error::{AppError, AppResult};
pub use types::{AuditRecordId, WalletId};
