//! Listing normalizer: exchange listing file → canonical provider symbols.
//!
//! Every row after the dialect's header rows (and before its footer rows)
//! must carry a ticker in its first field. Malformed rows are fatal: a row
//! skipped here would silently shrink the universe being checked.

use crate::domain::{join_symbols, Exchange, Symbol};
use crate::publish::write_atomic;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of the normalized-list artifact written next to the input.
pub const PARSED_PREFIX: &str = "parsed_";

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("malformed row at line {line}: expected at least {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("malformed row at line {line}: empty ticker field")]
    EmptyTicker { line: u64 },

    #[error("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse listing: {0}")]
    Csv(#[from] csv::Error),
}

/// Apply the exchange's symbol rule to one raw ticker.
pub fn normalize_symbol(raw: &str, exchange: Exchange) -> Symbol {
    Symbol::new(exchange.dialect().rule.apply(raw.trim()))
}

/// Read a listing file and return its normalized, de-duplicated symbols.
pub fn normalize_listing(path: &Path, exchange: Exchange) -> Result<Vec<Symbol>, ListingError> {
    if !path.is_file() {
        return Err(ListingError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|source| ListingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_listing(&decode_listing(&bytes), exchange)
}

/// Parse listing text already in memory.
pub fn parse_listing(text: &str, exchange: Exchange) -> Result<Vec<Symbol>, ListingError> {
    let dialect = exchange.dialect();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let records = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;

    if records.len() <= dialect.header_rows + dialect.footer_rows {
        debug!(exchange = %exchange, rows = records.len(), "listing has no data rows");
        return Ok(Vec::new());
    }

    let expected = records[..dialect.header_rows]
        .last()
        .map(|r| r.len())
        .unwrap_or(1)
        .max(1);
    let body = &records[dialect.header_rows..records.len() - dialect.footer_rows];

    let mut seen = HashSet::new();
    let mut symbols = Vec::with_capacity(body.len());
    for record in body {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() < expected {
            return Err(ListingError::MalformedRow {
                line,
                expected,
                found: record.len(),
            });
        }
        let raw = record.get(0).unwrap_or_default();
        if raw.is_empty() {
            return Err(ListingError::EmptyTicker { line });
        }

        let symbol = normalize_symbol(raw, exchange);
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        } else {
            warn!(%symbol, line, "duplicate ticker in listing, keeping first occurrence");
        }
    }

    Ok(symbols)
}

/// Path of the normalized-list artifact: `parsed_<file name>` beside the input.
pub fn parsed_listing_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{PARSED_PREFIX}{name}"))
}

/// Normalize `input` and persist the result as `parsed_<file name>`.
///
/// Returns the symbols together with the artifact path.
pub fn extract_symbols(
    input: &Path,
    exchange: Exchange,
) -> Result<(Vec<Symbol>, PathBuf), ListingError> {
    let symbols = normalize_listing(input, exchange)?;
    let out = parsed_listing_path(input);
    write_symbol_list(&out, &symbols)?;
    Ok((symbols, out))
}

/// Write `symbols` comma-joined to `path`, replacing any previous file.
pub fn write_symbol_list(path: &Path, symbols: &[Symbol]) -> Result<(), ListingError> {
    write_atomic(path, join_symbols(symbols).as_bytes()).map_err(|source| ListingError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Listings are UTF-8 or, for B3 exports, Windows-1252.
fn decode_listing(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text
        }
    }
}
