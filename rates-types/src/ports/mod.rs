//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod publisher;
mod quote_source;

pub use publisher::GraphPublisher;
pub use quote_source::QuoteSource;
