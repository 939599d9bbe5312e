use super::Symbol;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Closed date interval shared by every fetch in a run.
///
/// Both ends are kept exactly as given (`YYYY-MM-DD`). Calendar validation
/// is left to the provider; an invalid date surfaces as a provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// One adjusted-close observation. `None` is a provider-reported null.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: Option<f64>,
}

/// Adjusted-close series of one symbol, sorted ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from unordered points.
    ///
    /// Points are sorted by date; when a date repeats, the first point wins.
    pub fn new(symbol: Symbol, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
        for p in points {
            by_date.entry(p.date).or_insert(p.adj_close);
        }
        Self {
            symbol,
            points: by_date
                .into_iter()
                .map(|(date, adj_close)| PricePoint { date, adj_close })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}
