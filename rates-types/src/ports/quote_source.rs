//! Exchange rate provider port.
//!
//! This trait defines the interface for rate providers.
//! Implementations can be HTTP clients, mock providers, etc.

use chrono::{Days, NaiveDate};

use crate::domain::{Pair, Quote, RatePoint, pct_change};
use crate::error::RateError;

/// Port trait for point-in-time rate lookups.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest published rate, together with the day the provider reports it for.
    async fn fetch_latest(&self, pair: &Pair) -> Result<RatePoint, RateError>;

    /// Rate published for a specific calendar day (UTC).
    async fn fetch_on_date(&self, pair: &Pair, date: NaiveDate) -> Result<f64, RateError>;

    /// Latest rate plus its change against the previous calendar day.
    ///
    /// A failing previous-day lookup leaves `delta_pct` empty instead of
    /// failing the quote.
    async fn fetch_current(&self, pair: &Pair) -> Result<Quote, RateError> {
        let latest = self.fetch_latest(pair).await?;

        let previous = match latest.date.checked_sub_days(Days::new(1)) {
            Some(day) => self.fetch_on_date(pair, day).await.ok(),
            None => None,
        };
        let delta_pct = previous.and_then(|prev| pct_change(prev, latest.rate));

        Ok(Quote::new(latest.rate, delta_pct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedSource {
        latest: Result<RatePoint, RateError>,
        previous: Result<f64, RateError>,
        requested: Mutex<Vec<NaiveDate>>,
    }

    #[async_trait::async_trait]
    impl QuoteSource for FixedSource {
        async fn fetch_latest(&self, _pair: &Pair) -> Result<RatePoint, RateError> {
            self.latest.clone()
        }

        async fn fetch_on_date(&self, _pair: &Pair, date: NaiveDate) -> Result<f64, RateError> {
            self.requested.lock().unwrap().push(date);
            self.previous.clone()
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_current_quote_uses_previous_calendar_day() {
        let source = FixedSource {
            latest: Ok(RatePoint {
                date: day(2024, 3, 1),
                rate: 1.10,
            }),
            previous: Ok(1.00),
            requested: Mutex::new(Vec::new()),
        };

        let quote = source.fetch_current(&Pair::new("EUR", "USD")).await.unwrap();

        assert_eq!(quote.rate, 1.10);
        assert!((quote.delta_pct.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(*source.requested.lock().unwrap(), vec![day(2024, 2, 29)]);
    }

    #[tokio::test]
    async fn test_failed_previous_day_keeps_rate() {
        let source = FixedSource {
            latest: Ok(RatePoint {
                date: day(2024, 3, 1),
                rate: 0.92,
            }),
            previous: Err(RateError::Network("timeout".into())),
            requested: Mutex::new(Vec::new()),
        };

        let quote = source.fetch_current(&Pair::new("USD", "EUR")).await.unwrap();

        assert_eq!(quote.rate, 0.92);
        assert_eq!(quote.delta_pct, None);
    }

    #[tokio::test]
    async fn test_zero_previous_rate_has_no_delta() {
        let source = FixedSource {
            latest: Ok(RatePoint {
                date: day(2024, 3, 1),
                rate: 0.92,
            }),
            previous: Ok(0.0),
            requested: Mutex::new(Vec::new()),
        };

        let quote = source.fetch_current(&Pair::new("USD", "EUR")).await.unwrap();
        assert_eq!(quote.delta_pct, None);
    }

    #[tokio::test]
    async fn test_invalid_latest_fails_quote() {
        let source = FixedSource {
            latest: Err(RateError::InvalidCurrency("XXX".into())),
            previous: Ok(1.0),
            requested: Mutex::new(Vec::new()),
        };

        let result = source.fetch_current(&Pair::new("XXX", "EUR")).await;
        assert!(matches!(result, Err(RateError::InvalidCurrency(_))));
        assert!(source.requested.lock().unwrap().is_empty());
    }
}
