//! Date-aligned adjusted-close panel.
//!
//! Columns are symbols, rows are the union of every date seen. Rows are
//! assigned an id the first time their date appears, so folding a new
//! series never rewrites existing columns: each column is a growable
//! `Vec<Option<f64>>` indexed by row id and implicitly missing past its end.
//! Sorted views are produced on demand.

use crate::domain::{PriceSeries, Symbol};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Column {
    symbol: Symbol,
    values: Vec<Option<f64>>,
}

impl Column {
    fn get(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().flatten()
    }
}

/// Outer-joined wide table of adjusted closes.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    /// Date of each row id, in first-seen order.
    row_dates: Vec<NaiveDate>,
    row_of: HashMap<NaiveDate, usize>,
    columns: Vec<Column>,
    column_of: HashMap<Symbol, usize>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outer-join one series onto the panel as a new column.
    ///
    /// Returns `false` (and leaves the panel untouched) for an empty series or
    /// a symbol that is already a column.
    pub fn fold(&mut self, series: PriceSeries) -> bool {
        if series.is_empty() || self.column_of.contains_key(&series.symbol) {
            return false;
        }

        let mut values: Vec<Option<f64>> = Vec::new();
        for point in &series.points {
            let row = match self.row_of.get(&point.date) {
                Some(&row) => row,
                None => {
                    let row = self.row_dates.len();
                    self.row_dates.push(point.date);
                    self.row_of.insert(point.date, row);
                    row
                }
            };
            if values.len() <= row {
                values.resize(row + 1, None);
            }
            values[row] = point.adj_close;
        }

        self.column_of.insert(series.symbol.clone(), self.columns.len());
        self.columns.push(Column {
            symbol: series.symbol,
            values,
        });
        true
    }

    pub fn row_count(&self) -> usize {
        self.row_dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Symbols in column order (the order they were folded in).
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.columns.iter().map(|c| &c.symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.column_of.contains_key(symbol)
    }

    /// Row ids ordered by ascending date.
    fn sorted_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = (0..self.row_dates.len()).collect();
        rows.sort_by_key(|&r| self.row_dates[r]);
        rows
    }

    /// The date union, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.sorted_rows()
            .into_iter()
            .map(|r| self.row_dates[r])
            .collect()
    }

    /// Values of one column aligned to [`Panel::dates`].
    pub fn column(&self, symbol: &Symbol) -> Option<Vec<Option<f64>>> {
        let column = &self.columns[*self.column_of.get(symbol)?];
        Some(
            self.sorted_rows()
                .into_iter()
                .map(|r| column.get(r))
                .collect(),
        )
    }

    /// Number of rows in the date union where `symbol` has no value.
    pub fn missing_count(&self, symbol: &Symbol) -> Option<usize> {
        let column = &self.columns[*self.column_of.get(symbol)?];
        Some(Self::count_missing(column, self.row_count()))
    }

    /// Missing-cell count of every column, in column order.
    pub fn missing_counts(&self) -> impl Iterator<Item = (&Symbol, usize)> {
        let rows = self.row_count();
        self.columns
            .iter()
            .map(move |c| (&c.symbol, Self::count_missing(c, rows)))
    }

    fn count_missing(column: &Column, rows: usize) -> usize {
        let present = column.values.iter().filter(|v| v.is_some()).count();
        rows - present
    }

    /// Rows as `(date, values in column order)`, ascending by date.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, Vec<Option<f64>>)> + '_ {
        self.sorted_rows().into_iter().map(move |r| {
            (
                self.row_dates[r],
                self.columns.iter().map(|c| c.get(r)).collect(),
            )
        })
    }
}
