//! Shared types and configuration for Cortado.
//!
//! This crate provides common types used across all other crates:
//! - Minor-unit amount type (integer money, no floats)
//! - Typed IDs for type-safe entity references
//! - Cursor pagination types for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
