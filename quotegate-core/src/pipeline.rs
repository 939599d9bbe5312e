//! End-to-end check: listing → symbols → panel → partition → published lists.

use crate::classify::Partition;
use crate::data::{extract_symbols, run_check, CheckProgress, SeriesFetcher};
use crate::domain::{DateRange, Exchange, Symbol};
use crate::error::CheckError;
use crate::export::export_clean_panel;
use crate::publish::{PublishedPaths, Publisher};
use std::path::{Path, PathBuf};
use tracing::info;

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub input: PathBuf,
    pub exchange: Exchange,
    pub range: DateRange,
    /// Where to write the clean price panel as CSV, if anywhere.
    pub panel_out: Option<PathBuf>,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub symbols: Vec<Symbol>,
    pub parsed_path: PathBuf,
    pub partition: Partition,
    pub published: PublishedPaths,
    /// Size of the assembled panel as (dates, symbols).
    pub panel_shape: (usize, usize),
    pub panel_export: Option<PathBuf>,
}

/// Run the whole pipeline for one listing file.
///
/// Nothing under the output layout is written unless every fetch completed;
/// a provider error aborts before publication.
pub fn check_listing(
    request: &CheckRequest,
    fetcher: &dyn SeriesFetcher,
    publisher: &Publisher,
    progress: &dyn CheckProgress,
) -> Result<CheckReport, CheckError> {
    let (symbols, parsed_path) = extract_symbols(&request.input, request.exchange)?;
    info!(
        count = symbols.len(),
        path = %parsed_path.display(),
        provider = fetcher.name(),
        "normalized listing"
    );

    let outcome = run_check(&symbols, &request.range, fetcher, progress)?;

    let published = publisher.publish(
        &outcome.partition,
        request.exchange,
        &list_file_name(&parsed_path),
    )?;

    let panel_export = match &request.panel_out {
        Some(path) => {
            export_clean_panel(&outcome.panel, &outcome.partition.clean, path)?;
            info!(path = %path.display(), "clean panel exported");
            Some(path.clone())
        }
        None => None,
    };

    Ok(CheckReport {
        symbols,
        parsed_path,
        panel_shape: (outcome.panel.row_count(), outcome.panel.column_count()),
        partition: outcome.partition,
        published,
        panel_export,
    })
}

/// Result lists are named after the normalized listing, e.g. `parsed_nyse.csv`.
fn list_file_name(parsed_path: &Path) -> String {
    parsed_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
