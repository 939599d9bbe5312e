//! Listing ingestion, series retrieval and panel assembly

pub mod download;
pub mod listing;
pub mod panel;
pub mod provider;
pub mod yahoo;

pub use download::{run_check, CheckOutcome, CheckProgress, FetchStatus, LogProgress, NoProgress};
pub use listing::{
    extract_symbols, normalize_listing, normalize_symbol, parse_listing, parsed_listing_path,
    write_symbol_list, ListingError,
};
pub use panel::Panel;
pub use provider::{FetchOutcome, ProviderError, SeriesFetcher};
pub use yahoo::YahooProvider;
