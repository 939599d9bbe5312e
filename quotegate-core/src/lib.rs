//! quotegate core: input-quality gate for exchange symbol universes.
//!
//! This crate turns an exchange listing into three symbol lists:
//! - Listing normalization per exchange dialect (suffixing, escaping)
//! - Sequential adjusted-close retrieval with per-symbol "no data" tolerance
//! - Outer-join panel assembly on a shared date index
//! - Completeness classification (failed download / missing values / clean)
//! - Atomic publication under a configurable output layout

pub mod classify;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod publish;

pub use classify::{classify, Completeness, Partition};
pub use config::{CheckConfig, ConfigError, OutputConfig, ProviderConfig};
pub use domain::{DateRange, Exchange, Symbol};
pub use error::CheckError;
pub use pipeline::{check_listing, CheckReport, CheckRequest};
pub use publish::{Category, LayoutStyle, OutputLayout, PublishError, PublishedPaths, Publisher};
