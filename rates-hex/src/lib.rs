//! # Rates Hex
//!
//! Application service layer for the currency rate service.
//!
//! ## Architecture
//!
//! - `service` - Application service (quotes, conversion, scheme, graphs)
//! - `cache` - Time-bounded quote cache shared across requests
//! - `history` - Multi-date history aggregation
//!
//! The service is generic over `S: QuoteSource` and the graph pipeline over
//! `P: GraphPublisher`, so provider and storage adapters are injected.

pub mod cache;
pub mod history;
pub mod service;


pub use cache::{CachedQuote, QUOTE_TTL, QuoteCache};
pub use history::{CHANGE_LABELS, HistoryAggregator, SCHEME_OFFSETS, chart_offsets};
pub use service::{
    Conversion, GraphPipeline, GraphReport, HistoryChange, RateService, SchemeReport, graph_name,
};
