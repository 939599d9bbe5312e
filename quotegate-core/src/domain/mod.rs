//! Domain types for quotegate

pub mod exchange;
pub mod series;
pub mod symbol;

pub use exchange::{Dialect, Exchange, InvalidExchangeError, SymbolRule};
pub use series::{DateRange, PricePoint, PriceSeries};
pub use symbol::{join_symbols, Symbol};
