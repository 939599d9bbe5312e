//! Exchange tags and their listing-file dialects.
//!
//! Each exchange publishes its constituent list in its own format. The
//! dialect captures everything the normalizer needs to know about that
//! format: field delimiter, how many header and footer rows to discard, and
//! how to turn a raw ticker into the provider's symbol format.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Exchange whose listing file is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    /// B3 (Brasil Bolsa Balcão). Semicolon-separated portfolio export.
    B3,
    Nyse,
    Nasdaq,
    Amex,
}

/// How a raw ticker is rewritten into the provider's symbol format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRule {
    /// Append a market suffix (`PETR4` → `PETR4.SA`).
    Suffix(&'static str),
    /// Replace `/` and `.` with `-` (`BRK/B` → `BRK-B`, `BF.B` → `BF-B`).
    Escape,
}

/// Listing-file format of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub header_rows: usize,
    pub footer_rows: usize,
    pub rule: SymbolRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid exchange '{tag}' (expected one of: b3, nyse, nasdaq, amex)")]
pub struct InvalidExchangeError {
    pub tag: String,
}

impl Exchange {
    pub const ALL: [Exchange; 4] = [Exchange::B3, Exchange::Nyse, Exchange::Nasdaq, Exchange::Amex];

    /// Lowercase tag as accepted on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            Exchange::B3 => "b3",
            Exchange::Nyse => "nyse",
            Exchange::Nasdaq => "nasdaq",
            Exchange::Amex => "amex",
        }
    }

    pub fn dialect(self) -> Dialect {
        match self {
            Exchange::B3 => Dialect {
                delimiter: b';',
                header_rows: 2,
                footer_rows: 2,
                rule: SymbolRule::Suffix(".SA"),
            },
            Exchange::Nyse | Exchange::Nasdaq | Exchange::Amex => Dialect {
                delimiter: b',',
                header_rows: 1,
                footer_rows: 0,
                rule: SymbolRule::Escape,
            },
        }
    }
}

impl SymbolRule {
    pub fn apply(self, raw: &str) -> String {
        match self {
            SymbolRule::Suffix(suffix) => format!("{raw}{suffix}"),
            SymbolRule::Escape => raw.replace(['/', '.'], "-"),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Exchange {
    type Err = InvalidExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exchange::ALL
            .into_iter()
            .find(|e| e.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidExchangeError { tag: s.to_string() })
    }
}
