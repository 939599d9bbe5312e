//! Check orchestrator. Fetches every symbol in order and folds the results.
//!
//! Fetches are strictly sequential: one blocking request at a time, in the
//! order of the normalized listing. That keeps load on the provider
//! predictable and makes the panel's column order a function of the input.

use super::panel::Panel;
use super::provider::{FetchOutcome, ProviderError, SeriesFetcher};
use crate::classify::{classify, Partition};
use crate::domain::{DateRange, Symbol};
use std::collections::HashSet;
use tracing::{info, warn};

/// Per-symbol status reported to progress observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// Folded into the panel with this many observations.
    Folded { points: usize },
    /// Routed to the failed-download set.
    NoData { reason: String },
}

/// Progress callback for the fetch loop.
pub trait CheckProgress {
    /// Called before fetching a symbol. `index` is zero-based.
    fn on_start(&self, symbol: &Symbol, index: usize, total: usize);

    /// Called when a symbol's fetch has been handled.
    fn on_outcome(&self, symbol: &Symbol, index: usize, total: usize, status: &FetchStatus);

    /// Called once the partition is known.
    fn on_finished(&self, partition: &Partition);
}

/// Progress reporter that emits `tracing` events.
pub struct LogProgress;

impl CheckProgress for LogProgress {
    fn on_start(&self, symbol: &Symbol, index: usize, total: usize) {
        info!("Downloading data from {symbol}... ({}/{total})", index + 1);
    }

    fn on_outcome(&self, symbol: &Symbol, _index: usize, _total: usize, status: &FetchStatus) {
        match status {
            FetchStatus::Folded { points } => info!(%symbol, points, "series folded into panel"),
            FetchStatus::NoData { reason } => {
                warn!(%symbol, %reason, "No data found for {symbol}, skipping...")
            }
        }
    }

    fn on_finished(&self, partition: &Partition) {
        info!(
            failed = partition.failed_download.len(),
            has_missing = partition.has_missing_values.len(),
            clean = partition.clean.len(),
            "integrity check complete"
        );
    }
}

/// Silent progress reporter.
pub struct NoProgress;

impl CheckProgress for NoProgress {
    fn on_start(&self, _: &Symbol, _: usize, _: usize) {}
    fn on_outcome(&self, _: &Symbol, _: usize, _: usize, _: &FetchStatus) {}
    fn on_finished(&self, _: &Partition) {}
}

/// Result of a full check: the assembled panel and the derived partition.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub panel: Panel,
    pub partition: Partition,
}

/// Fetch every symbol in order, fold non-empty series into a panel, and
/// partition the symbols by completeness.
///
/// A `NoData` outcome is handled locally; a `ProviderError` aborts the run
/// immediately and is returned to the caller. A symbol repeated in `symbols`
/// is fetched once, at its first position.
pub fn run_check(
    symbols: &[Symbol],
    range: &DateRange,
    fetcher: &dyn SeriesFetcher,
    progress: &dyn CheckProgress,
) -> Result<CheckOutcome, ProviderError> {
    let mut seen = HashSet::new();
    let symbols: Vec<&Symbol> = symbols
        .iter()
        .filter(|&symbol| {
            let first = seen.insert(symbol);
            if !first {
                warn!(%symbol, "symbol repeated in input, fetching it once");
            }
            first
        })
        .collect();
    let total = symbols.len();
    let mut panel = Panel::new();
    let mut failed: Vec<Symbol> = Vec::new();

    for (i, &symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        let status = match fetcher.fetch(symbol, range)? {
            FetchOutcome::Series(series) => {
                let points = series.len();
                if panel.fold(series) {
                    FetchStatus::Folded { points }
                } else {
                    FetchStatus::NoData {
                        reason: "series could not be folded into the panel".into(),
                    }
                }
            }
            FetchOutcome::NoData { reason } => FetchStatus::NoData { reason },
        };

        if let FetchStatus::NoData { .. } = status {
            failed.push(symbol.clone());
        }
        progress.on_outcome(symbol, i, total, &status);
    }

    let partition = Partition::new(failed, classify(&panel));
    progress.on_finished(&partition);

    Ok(CheckOutcome { panel, partition })
}
