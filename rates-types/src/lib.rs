//! # Rates Types
//!
//! Domain types and port traits for the currency rate service.
//! This crate has ZERO IO dependencies - only data structures,
//! rate arithmetic, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, Pair, Quote, History)
//! - `ports/` - Trait definitions that adapters must implement
//! - `error/` - Rate, publish and application error types

pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CurrencyCode, History, HistoryNode, Offset, Pair, Quote, RatePoint, format_delta,
    format_value, pct_change,
};
pub use error::{AppError, PublishError, RateError};
pub use ports::{GraphPublisher, QuoteSource};
