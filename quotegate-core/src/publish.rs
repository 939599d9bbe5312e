//! Result publisher: persists the partition as three comma-joined lists.
//!
//! The output layout is resolved once at startup and injected here. Every
//! directory a run needs is created before the first file is written, and
//! each file is written atomically (write to `.tmp`, rename into place), so a
//! failure never leaves a half-written list behind and re-runs simply
//! overwrite.

use crate::classify::Partition;
use crate::domain::{join_symbols, Exchange, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Directory layout for the three result lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStyle {
    /// `removed_data/download_failed_<f>`, `removed_data/NaN_values_<f>`,
    /// `pre_processed_data/pre_processed_<f>`.
    #[default]
    Flat,
    /// Category and exchange subdirectories:
    /// `removed_data/failed_download/<exchange>/download_failed_<f>`,
    /// `removed_data/NaN_values/<exchange>/NaN_values_<f>`,
    /// `pre_processed_data/<exchange>/pre_processed_<f>`.
    ByExchange,
}

impl FromStr for LayoutStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "flat" => Ok(LayoutStyle::Flat),
            "by_exchange" => Ok(LayoutStyle::ByExchange),
            other => Err(format!("unknown layout '{other}' (expected flat or by-exchange)")),
        }
    }
}

/// One of the three persisted lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    FailedDownload,
    NanValues,
    Clean,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::FailedDownload, Category::NanValues, Category::Clean];

    fn file_prefix(self) -> &'static str {
        match self {
            Category::FailedDownload => "download_failed_",
            Category::NanValues => "NaN_values_",
            Category::Clean => "pre_processed_",
        }
    }

    fn flat_dir(self) -> &'static str {
        match self {
            Category::FailedDownload | Category::NanValues => "removed_data",
            Category::Clean => "pre_processed_data",
        }
    }

    fn nested_dir(self) -> PathBuf {
        match self {
            Category::FailedDownload => Path::new("removed_data").join("failed_download"),
            Category::NanValues => Path::new("removed_data").join("NaN_values"),
            Category::Clean => PathBuf::from("pre_processed_data"),
        }
    }

    fn select(self, partition: &Partition) -> &[Symbol] {
        match self {
            Category::FailedDownload => &partition.failed_download,
            Category::NanValues => &partition.has_missing_values,
            Category::Clean => &partition.clean,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::FailedDownload => "failed downloads",
            Category::NanValues => "NaN values",
            Category::Clean => "cleaned data",
        })
    }
}

/// Where result lists go, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub style: LayoutStyle,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, style: LayoutStyle) -> Self {
        Self {
            root: root.into(),
            style,
        }
    }

    /// Path of one category's list for an input file name.
    pub fn path(&self, category: Category, exchange: Exchange, file_name: &str) -> PathBuf {
        let dir = match self.style {
            LayoutStyle::Flat => self.root.join(category.flat_dir()),
            LayoutStyle::ByExchange => self.root.join(category.nested_dir()).join(exchange.tag()),
        };
        dir.join(format!("{}{file_name}", category.file_prefix()))
    }

    pub fn paths(&self, exchange: Exchange, file_name: &str) -> PublishedPaths {
        PublishedPaths {
            failed_download: self.path(Category::FailedDownload, exchange, file_name),
            nan_values: self.path(Category::NanValues, exchange, file_name),
            clean: self.path(Category::Clean, exchange, file_name),
        }
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(".", LayoutStyle::Flat)
    }
}

/// Paths of the three written lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPaths {
    pub failed_download: PathBuf,
    pub nan_values: PathBuf,
    pub clean: PathBuf,
}

impl PublishedPaths {
    pub fn get(&self, category: Category) -> &Path {
        match category {
            Category::FailedDownload => &self.failed_download,
            Category::NanValues => &self.nan_values,
            Category::Clean => &self.clean,
        }
    }
}

/// Writes partitions according to an [`OutputLayout`].
#[derive(Debug, Clone)]
pub struct Publisher {
    layout: OutputLayout,
}

impl Publisher {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Persist the partition for the listing named `file_name`.
    pub fn publish(
        &self,
        partition: &Partition,
        exchange: Exchange,
        file_name: &str,
    ) -> Result<PublishedPaths, PublishError> {
        let paths = self.layout.paths(exchange, file_name);

        for category in Category::ALL {
            if let Some(dir) = paths.get(category).parent() {
                ensure_dir(dir)?;
            }
        }

        for category in Category::ALL {
            let path = paths.get(category);
            write_atomic(path, join_symbols(category.select(partition)).as_bytes()).map_err(
                |source| PublishError::Write {
                    path: path.to_path_buf(),
                    source,
                },
            )?;
            info!(path = %path.display(), count = category.select(partition).len(), "{category} saved");
        }

        Ok(paths)
    }
}

fn ensure_dir(dir: &Path) -> Result<(), PublishError> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    warn!(dir = %dir.display(), "output directory does not exist, creating it");
    fs::create_dir_all(dir).map_err(|source| PublishError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `contents` to `path` via a sibling `.tmp` file and a rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        e
    })
}
