//! Domain models for the rate service.

pub mod currency;
pub mod history;
pub mod quote;

pub use currency::{CurrencyCode, Pair};
pub use history::{History, HistoryNode, Offset};
pub use quote::{Quote, RatePoint, format_delta, format_value, pct_change};
