//! Shared types and configuration for Partida.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs and string codes for entity references
//! - The `Currency` enum with the local (functional) currency
//! - `PeriodId`, the YYYYMM key of a tax period
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
