//! Clean price panel export.
//!
//! Writes the adjusted closes of the clean symbols as a wide CSV:
//! `date,<sym1>,<sym2>,...`, one row per date of the panel's date union,
//! values at full `f64` precision.

use crate::data::panel::Panel;
use crate::domain::Symbol;
use crate::publish::write_atomic;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("symbol {0} is not a panel column")]
    UnknownSymbol(Symbol),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Render the panel restricted to `symbols` (in the given order) as CSV.
pub fn export_panel_csv(panel: &Panel, symbols: &[Symbol]) -> Result<String, ExportError> {
    let columns = symbols
        .iter()
        .map(|s| panel.column(s).ok_or_else(|| ExportError::UnknownSymbol(s.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date".to_string()];
    header.extend(symbols.iter().map(Symbol::to_string));
    wtr.write_record(&header)?;

    for (row, date) in panel.dates().into_iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(date.to_string());
        record.extend(
            columns
                .iter()
                .map(|c| c[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    String::from_utf8(data).map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write the clean panel to `path`, overwriting any previous export.
pub fn export_clean_panel(panel: &Panel, clean: &[Symbol], path: &Path) -> Result<(), ExportError> {
    let csv = export_panel_csv(panel, clean)?;
    write_atomic(path, csv.as_bytes())?;
    Ok(())
}
