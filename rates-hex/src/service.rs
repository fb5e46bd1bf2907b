//! Rate Application Service
//!
//! Orchestrates quotes, histories and charts through the ports.
//! Contains NO infrastructure logic - pure orchestration.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rates_chart::{ChartRenderer, PALETTE, SeriesEntry};
use rates_types::{
    AppError, CurrencyCode, GraphPublisher, History, Offset, Pair, Quote, QuoteSource, RateError,
    format_delta, format_value,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::QuoteCache;
use crate::history::{CHANGE_LABELS, HistoryAggregator, SCHEME_OFFSETS, chart_offsets};

/// Amount both sides of a scheme comparison are quoted for.
pub const SCHEME_UNITS: f64 = 100.0;

/// Result of converting an amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub value: f64,
    pub rate: f64,
    pub delta_pct: Option<f64>,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_value(self.value), self.to)?;
        if let Some(delta) = self.delta_pct {
            write!(f, " ({} 24h change)", format_delta(delta))?;
        }
        Ok(())
    }
}

/// Change of a pair over one history window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryChange {
    pub label: String,
    pub delta_pct: Option<f64>,
}

impl fmt::Display for HistoryChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.delta_pct {
            Some(delta) => write!(f, "{}: {}", self.label, format_delta(delta)),
            None => write!(f, "{}: n/a", self.label),
        }
    }
}

/// A currency compared against a reference currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemeReport {
    pub code: CurrencyCode,
    pub reference: CurrencyCode,
    /// Reference units per 1 unit of `code`.
    pub rate: f64,
    pub delta_pct: Option<f64>,
    pub changes: Vec<HistoryChange>,
}

impl SchemeReport {
    /// `code` units per 1 unit of `reference`.
    pub fn inverse_rate(&self) -> f64 {
        1.0 / self.rate
    }

    /// `100 CODE = X REF`
    pub fn forward_line(&self) -> String {
        format!(
            "{} {} = {} {}",
            SCHEME_UNITS,
            self.code,
            format_value(self.rate * SCHEME_UNITS),
            self.reference
        )
    }

    /// `100 REF = Y CODE`
    pub fn inverse_line(&self) -> String {
        format!(
            "{} {} = {} {}",
            SCHEME_UNITS,
            self.reference,
            format_value(self.inverse_rate() * SCHEME_UNITS),
            self.code
        )
    }
}

impl fmt::Display for SchemeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.forward_line())?;
        write!(f, "{}", self.inverse_line())?;
        for change in &self.changes {
            write!(f, "\n{}", change)?;
        }
        Ok(())
    }
}

/// A published comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphReport {
    pub url: String,
    pub name: String,
    pub charted: Vec<CurrencyCode>,
    pub skipped: Vec<CurrencyCode>,
}

/// Renders charts and hands them to a publisher.
pub struct GraphPipeline<P: GraphPublisher> {
    renderer: ChartRenderer,
    publisher: P,
}

impl<P: GraphPublisher> GraphPipeline<P> {
    pub fn new(renderer: ChartRenderer, publisher: P) -> Self {
        Self {
            renderer,
            publisher,
        }
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Renders `entries` under `name` and returns the published URL.
    pub async fn publish(&self, entries: &[SeriesEntry], name: &str) -> Result<String, AppError> {
        info!("Generating graph image {}", name);
        let path = self
            .renderer
            .render(entries, name)
            .await
            .map_err(|e| AppError::Render(e.to_string()))?;

        info!("Uploading graph {}", path.display());
        let url = self.publisher.upload(&path).await?;
        Ok(url)
    }
}

/// Application service for rate operations.
///
/// Generic over `S: QuoteSource` - the provider adapter is injected at
/// construction, and so is the cache, so tests get a fresh one each.
pub struct RateService<S: QuoteSource> {
    source: S,
    cache: Arc<QuoteCache>,
}

impl<S: QuoteSource> RateService<S> {
    pub fn new(source: S, cache: Arc<QuoteCache>) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Live Quotes
    // ─────────────────────────────────────────────────────────────────────────────

    /// Current quote for `pair`, served from the cache while fresh.
    #[instrument(skip(self, pair), fields(pair = %pair))]
    pub async fn quote(&self, pair: &Pair) -> Result<Quote, AppError> {
        check_code(&pair.from)?;
        check_code(&pair.to)?;

        if let Some(quote) = self.cache.get(pair) {
            debug!("Quote cache hit");
            return Ok(quote);
        }

        let quote = self.source.fetch_current(pair).await.map_err(|e| {
            warn!("Failed to fetch quote: {}", e);
            AppError::no_result(pair, e)
        })?;
        if !quote.rate.is_finite() {
            return Err(AppError::no_result(
                pair,
                RateError::InvalidCurrency(format!("non-finite rate for {}", pair.to)),
            ));
        }

        self.cache.put(pair.clone(), quote);
        Ok(quote)
    }

    /// Converts `amount` of `from` into `to`.
    pub async fn convert(
        &self,
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Conversion, AppError> {
        if !amount.is_finite() {
            return Err(AppError::BadRequest(format!("Invalid amount: {}", amount)));
        }

        let pair = Pair::new(from, to);
        let quote = self.quote(&pair).await?;
        let value = quote.rate * amount;
        info!("Currency convert for {} {}: {} {}", amount, pair.from, value, pair.to);

        Ok(Conversion {
            from: pair.from,
            to: pair.to,
            amount,
            value,
            rate: quote.rate,
            delta_pct: quote.delta_pct,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────────

    /// Resolves `offsets` for `pair`, degrading failed samples to zero.
    pub async fn history(
        &self,
        pair: &Pair,
        offsets: &[Offset],
        today: NaiveDate,
    ) -> Result<History, AppError> {
        HistoryAggregator::new(&self.source)
            .build(pair, offsets, today)
            .await
            .map_err(|e| AppError::no_result(pair, e))
    }

    /// Compares `code` against `reference` now and over 24h, 1w, 1m and 3m.
    #[instrument(skip(self))]
    pub async fn scheme(
        &self,
        code: CurrencyCode,
        reference: CurrencyCode,
        today: NaiveDate,
    ) -> Result<SchemeReport, AppError> {
        let pair = Pair::new(code, reference);
        let quote = self.quote(&pair).await?;
        if quote.rate == 0.0 {
            return Err(AppError::no_result(
                &pair,
                RateError::InvalidCurrency(format!("zero rate for {}", pair)),
            ));
        }

        let offsets: Vec<Offset> = SCHEME_OFFSETS.iter().copied().map(Offset::from).collect();
        let history = self.history(&pair, &offsets, today).await?;

        let changes = CHANGE_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let delta_pct = history.change(i + 1);
                debug!("History {} = {:?}", label, delta_pct);
                HistoryChange {
                    label: label.to_string(),
                    delta_pct,
                }
            })
            .collect();

        Ok(SchemeReport {
            code: pair.from,
            reference: pair.to,
            rate: quote.rate,
            delta_pct: quote.delta_pct,
            changes,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Charts
    // ─────────────────────────────────────────────────────────────────────────────

    /// Charts every code in `codes` against `reference` and publishes the image.
    ///
    /// Codes whose live quote or history cannot be resolved are skipped; the
    /// call fails only when none is left.
    #[instrument(skip(self, codes, pipeline), fields(codes = codes.len()))]
    pub async fn scheme_graph<P: GraphPublisher>(
        &self,
        codes: &[CurrencyCode],
        reference: CurrencyCode,
        today: NaiveDate,
        pipeline: &GraphPipeline<P>,
    ) -> Result<GraphReport, AppError> {
        if codes.is_empty() {
            return Err(AppError::BadRequest("No currency to chart".into()));
        }
        if codes.len() > PALETTE.len() {
            return Err(AppError::BadRequest(format!(
                "At most {} currencies can be charted together",
                PALETTE.len()
            )));
        }

        check_code(&reference)?;
        for code in codes {
            check_code(code)?;
        }

        let offsets = chart_offsets();
        let mut entries = Vec::with_capacity(codes.len());
        let mut skipped = Vec::new();
        let mut last_error = None;

        for code in codes {
            let pair = Pair::new(code.clone(), reference.clone());
            let resolved = match self.quote(&pair).await {
                Ok(_) => self.history(&pair, &offsets, today).await,
                Err(e) => Err(e),
            }
            .and_then(|history| {
                // nothing to draw when every dated lookup failed
                if history.values().all(|v| v == 0.0) {
                    return Err(AppError::no_result(
                        &pair,
                        RateError::InvalidCurrency(format!("no history for {}", pair)),
                    ));
                }
                Ok(history)
            });

            match resolved {
                Ok(history) => {
                    let entry = SeriesEntry::new(code.clone(), history, entries.len())
                        .map_err(|e| AppError::Render(e.to_string()))?;
                    entries.push(entry);
                }
                Err(e) => {
                    warn!("Skipping {} in graph: {}", code, e);
                    skipped.push(code.clone());
                    last_error = Some(e);
                }
            }
        }

        if entries.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| AppError::BadRequest("No currency to chart".into())));
        }

        let charted: Vec<CurrencyCode> = entries.iter().map(|e| e.code().clone()).collect();
        let name = graph_name(&charted, &reference);
        let url = pipeline.publish(&entries, &name).await?;

        Ok(GraphReport {
            url,
            name,
            charted,
            skipped,
        })
    }
}

fn check_code(code: &CurrencyCode) -> Result<(), AppError> {
    if code.is_well_formed() {
        return Ok(());
    }
    if code.is_empty() {
        return Err(AppError::BadRequest("Currency code cannot be empty".into()));
    }
    Err(AppError::BadRequest(format!(
        "Invalid currency code: {:?}",
        code.as_str()
    )))
}

/// Deterministic image name: lowercase codes, then the reference, joined by `-`.
///
/// Only ASCII letters and digits of each code are kept, so the name is always
/// a plain file name inside the graph directory.
pub fn graph_name(codes: &[CurrencyCode], reference: &CurrencyCode) -> String {
    codes
        .iter()
        .chain(std::iter::once(reference))
        .map(|code| {
            code.to_lowercase()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}
