//! Completeness classification and the three-way symbol partition.
//!
//! "Complete" means calendar-complete relative to the panel's full date
//! union: a symbol that trades on a different calendar than its peers is
//! classified as having missing values even though it downloaded fine.

use crate::data::panel::Panel;
use crate::domain::Symbol;
use std::collections::HashSet;

/// Panel columns split by whether any cell is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completeness {
    pub has_missing: Vec<Symbol>,
    pub clean: Vec<Symbol>,
}

/// Split the panel's columns, preserving column order in both lists.
pub fn classify(panel: &Panel) -> Completeness {
    let mut out = Completeness::default();
    for (symbol, missing) in panel.missing_counts() {
        if missing > 0 {
            out.has_missing.push(symbol.clone());
        } else {
            out.clean.push(symbol.clone());
        }
    }
    out
}

/// Every attempted symbol in exactly one of three sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub failed_download: Vec<Symbol>,
    pub has_missing_values: Vec<Symbol>,
    pub clean: Vec<Symbol>,
}

impl Partition {
    pub fn new(failed_download: Vec<Symbol>, completeness: Completeness) -> Self {
        Self {
            failed_download,
            has_missing_values: completeness.has_missing,
            clean: completeness.clean,
        }
    }

    /// All symbols across the three sets.
    pub fn attempted(&self) -> impl Iterator<Item = &Symbol> {
        self.failed_download
            .iter()
            .chain(&self.has_missing_values)
            .chain(&self.clean)
    }

    pub fn len(&self) -> usize {
        self.failed_download.len() + self.has_missing_values.len() + self.clean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the three sets are pairwise disjoint and their union is
    /// exactly `symbols`.
    pub fn is_consistent_with(&self, symbols: &[Symbol]) -> bool {
        let mut seen = HashSet::new();
        if !self.attempted().all(|s| seen.insert(s)) {
            return false;
        }
        let expected: HashSet<&Symbol> = symbols.iter().collect();
        seen == expected && expected.len() == symbols.len()
    }
}
