//! # Rates Adapters
//!
//! Outbound adapters for the rate service ports.
//!
//! - `currency_api` - [`CurrencyApi`], a `QuoteSource` over the public
//!   currency-api JSON files
//! - `publish` - [`LocalPublisher`] and [`HttpPublisher`], two `GraphPublisher`s

pub mod currency_api;
pub mod publish;

pub use currency_api::{CurrencyApi, DEFAULT_BASE_URL};
pub use publish::{HttpPublisher, LocalPublisher};
