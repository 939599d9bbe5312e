use crate::config::ConfigError;
use crate::data::{ListingError, ProviderError};
use crate::domain::InvalidExchangeError;
use crate::export::ExportError;
use crate::publish::PublishError;
use thiserror::Error;

/// Any failure that aborts a check run.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    InvalidExchange(#[from] InvalidExchangeError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error("provider failure: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("panel export failed: {0}")]
    Export(#[from] ExportError),
}
