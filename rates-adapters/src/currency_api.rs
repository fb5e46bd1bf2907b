//! HTTP client for the currency-api rate files.
//!
//! Every lookup is a single GET of
//! `{base}/{latest|YYYY-MM-DD}/currencies/{from}/{to}.json` with lowercase
//! codes. The body carries the publication `date` and the rate under the
//! target code, e.g. `{"date": "2024-03-31", "eur": 0.92}`.

use chrono::NaiveDate;
use rates_types::{Pair, QuoteSource, RateError, RatePoint};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/gh/fawazahmed0/currency-api@1";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `QuoteSource` backed by the currency-api CDN.
#[derive(Clone)]
pub struct CurrencyApi {
    base_url: String,
    http: Client,
}

impl Default for CurrencyApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CurrencyApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the rate file for `pair` at `time` (`latest` or a date).
    pub fn url(&self, pair: &Pair, time: &str) -> String {
        format!(
            "{}/{}/currencies/{}/{}.json",
            self.base_url,
            time,
            pair.from.to_lowercase(),
            pair.to.to_lowercase()
        )
    }

    async fn request(&self, pair: &Pair, time: &str) -> Result<Value, RateError> {
        let url = self.url(pair, time);
        debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            // unknown codes have no file
            warn!("Provider returned {} for {}, currency is probably invalid", status, pair);
            return Err(RateError::InvalidCurrency(pair.to_string()));
        }
        if !status.is_success() {
            return Err(RateError::Network(format!("HTTP {} from provider", status)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| RateError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| RateError::Network(format!("malformed body: {e}")))
    }
}

/// Numeric rate stored under the lowercase target code.
///
/// Numbers and numeric strings are both accepted; anything else, infinities
/// included, means the provider has no rate for that code.
fn parse_rate(body: &Value, pair: &Pair) -> Result<f64, RateError> {
    let key = pair.to.to_lowercase();
    let rate = match body.get(&key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match rate {
        Some(rate) if rate.is_finite() => Ok(rate),
        _ => {
            warn!("Received no value for {}, currency is probably invalid", pair);
            Err(RateError::InvalidCurrency(pair.to.to_string()))
        }
    }
}

fn parse_date(body: &Value) -> Result<NaiveDate, RateError> {
    let raw = body
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| RateError::Network("response has no date".into()))?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| RateError::Network(format!("bad date {raw:?}: {e}")))
}

#[async_trait::async_trait]
impl QuoteSource for CurrencyApi {
    #[instrument(skip(self, pair), fields(pair = %pair))]
    async fn fetch_latest(&self, pair: &Pair) -> Result<RatePoint, RateError> {
        let body = self.request(pair, "latest").await?;
        let rate = parse_rate(&body, pair)?;
        let date = parse_date(&body)?;
        debug!("Latest {} on {} = {}", pair, date, rate);
        Ok(RatePoint { date, rate })
    }

    #[instrument(skip(self, pair), fields(pair = %pair))]
    async fn fetch_on_date(&self, pair: &Pair, date: NaiveDate) -> Result<f64, RateError> {
        let body = self
            .request(pair, &date.format(DATE_FORMAT).to_string())
            .await?;
        parse_rate(&body, pair)
    }
}
