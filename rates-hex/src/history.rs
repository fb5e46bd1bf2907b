//! Historical rate aggregation.
//!
//! Resolves a list of day offsets into a [`History`] with one dated provider
//! request per sample, sequentially and in request order.

use chrono::{Days, NaiveDate};
use rates_types::{History, HistoryNode, Offset, Pair, QuoteSource, RateError};
use tracing::{debug, instrument, warn};

/// Offsets of the scheme comparison: now, 24h, 1w, 1m, 3m.
pub const SCHEME_OFFSETS: [u32; 5] = [0, 1, 7, 30, 90];

/// Labels of [`SCHEME_OFFSETS`] past index 0.
pub const CHANGE_LABELS: [&str; 4] = ["24h", "1w", "1m", "3m"];

/// Offsets of the chart: the scheme checkpoints plus one band of interior
/// samples per segment between 3m and 24h, oldest band first.
pub fn chart_offsets() -> Vec<Offset> {
    let mut offsets: Vec<Offset> = SCHEME_OFFSETS.iter().copied().map(Offset::from).collect();
    offsets.push([80, 70, 60, 50, 40].into());
    offsets.push([26, 22, 18, 14, 10].into());
    offsets.push([6, 5, 4, 3, 2].into());
    offsets
}

/// Builds histories from a [`QuoteSource`].
pub struct HistoryAggregator<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: QuoteSource + ?Sized> HistoryAggregator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolves `offsets` relative to `today`.
    ///
    /// A sample whose lookup fails becomes `0.0`, whatever the failure. The
    /// build itself only fails for a malformed code, before any request.
    #[instrument(skip(self, pair, offsets), fields(pair = %pair, offsets = offsets.len()))]
    pub async fn build(
        &self,
        pair: &Pair,
        offsets: &[Offset],
        today: NaiveDate,
    ) -> Result<History, RateError> {
        if !pair.from.is_well_formed() || !pair.to.is_well_formed() {
            return Err(RateError::InvalidCurrency(pair.to_string()));
        }

        let mut tally = Tally::default();
        let mut nodes = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let node = match offset {
                Offset::Days(days) => {
                    HistoryNode::Leaf(self.sample(pair, *days, today, &mut tally).await)
                }
                Offset::Band(band) => {
                    let mut values = Vec::with_capacity(band.len());
                    for days in band {
                        values.push(self.sample(pair, *days, today, &mut tally).await);
                    }
                    HistoryNode::Branch(values)
                }
            };
            nodes.push(node);
        }

        if tally.failed > 0 {
            warn!(
                "{} of {} history samples for {} defaulted to 0",
                tally.failed, tally.requested, pair
            );
        }

        Ok(History::new(nodes))
    }

    async fn sample(&self, pair: &Pair, days: u32, today: NaiveDate, tally: &mut Tally) -> f64 {
        tally.requested += 1;

        let Some(date) = today.checked_sub_days(Days::new(days.into())) else {
            tally.failed += 1;
            return 0.0;
        };

        match self.source.fetch_on_date(pair, date).await {
            Ok(rate) => {
                debug!("{} on {} = {}", pair, date, rate);
                rate
            }
            Err(e) => {
                tally.failed += 1;
                debug!("{} on {} failed: {}", pair, date, e);
                0.0
            }
        }
    }
}

#[derive(Default)]
struct Tally {
    requested: usize,
    failed: usize,
}
