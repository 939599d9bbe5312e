//! quotegate CLI: integrity gate for an exchange symbol universe.
//!
//! Usage: `quotegate <INPUT> <START_DATE> <END_DATE> [EXCHANGE]`
//!
//! Normalizes the listing (writing `parsed_<file>` beside it), downloads the
//! adjusted closes of every symbol from Yahoo Finance one at a time, and
//! writes three comma-joined lists: symbols whose download failed, symbols
//! with missing values on the panel's date union, and clean symbols.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use quotegate_core::data::{ListingError, LogProgress, YahooProvider};
use quotegate_core::{
    check_listing, CheckConfig, CheckReport, CheckRequest, DateRange, Exchange, LayoutStyle,
    Publisher,
};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quotegate",
    version,
    about = "Partition an exchange listing into failed-download, missing-value and clean symbols"
)]
struct Cli {
    /// Exchange listing file.
    input: PathBuf,

    /// Start date (YYYY-MM-DD), inclusive.
    start_date: String,

    /// End date (YYYY-MM-DD), inclusive.
    end_date: String,

    /// Listing dialect: b3, nyse, nasdaq or amex.
    #[arg(default_value = "nyse")]
    exchange: String,

    /// TOML config file (output layout, provider settings).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory under which the result lists are written. Overrides the config.
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Output layout: flat or by-exchange. Overrides the config.
    #[arg(long)]
    layout: Option<LayoutStyle>,

    /// Per-request timeout in seconds; a timed-out symbol counts as a failed download.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Also write the clean price panel as CSV to this path.
    #[arg(long)]
    panel_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            e.exit();
        }
        let _ = e.print();
        std::process::exit(1);
    });

    init_tracing();
    run(cli)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let exchange: Exchange = cli.exchange.parse()?;

    if !cli.input.is_file() {
        return Err(ListingError::FileNotFound { path: cli.input }.into());
    }

    let mut config = match &cli.config {
        Some(path) => CheckConfig::from_file(path)?,
        None => CheckConfig::default(),
    };
    if let Some(root) = cli.output_root {
        config.output.root = root;
    }
    if let Some(layout) = cli.layout {
        config.output.layout = layout;
    }
    if let Some(secs) = cli.timeout_secs {
        config.provider.timeout_secs = secs;
    }
    debug!(?config, "resolved configuration");

    let provider =
        YahooProvider::new(&config.provider).context("failed to initialise Yahoo Finance client")?;
    let publisher = Publisher::new(config.output_layout());

    let request = CheckRequest {
        input: cli.input,
        exchange,
        range: DateRange::new(cli.start_date, cli.end_date),
        panel_out: cli.panel_out,
    };

    let report = check_listing(&request, &provider, &publisher, &LogProgress)?;
    print_summary(&request, &report);
    Ok(())
}

fn print_summary(request: &CheckRequest, report: &CheckReport) {
    let p = &report.partition;
    println!();
    println!("=== Integrity Check ===");
    println!("Listing:        {} ({})", request.input.display(), request.exchange);
    println!("Period:         {} to {}", request.range.start, request.range.end);
    println!("Symbols:        {}", report.symbols.len());
    println!(
        "Panel:          {} dates x {} symbols",
        report.panel_shape.0, report.panel_shape.1
    );
    println!();
    println!("Failed:         {}", p.failed_download.len());
    println!("Missing values: {}", p.has_missing_values.len());
    println!("Clean:          {}", p.clean.len());
    println!();
    println!("Parsed list:    {}", report.parsed_path.display());
    println!("Failed list:    {}", report.published.failed_download.display());
    println!("NaN list:       {}", report.published.nan_values.display());
    println!("Clean list:     {}", report.published.clean.display());
    if let Some(path) = &report.panel_export {
        println!("Clean panel:    {}", path.display());
    }
}
