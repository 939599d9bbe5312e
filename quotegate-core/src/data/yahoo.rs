//! Yahoo Finance series fetcher.
//!
//! Fetches daily adjusted closes from Yahoo's v8 chart API. One request per
//! symbol, no retries: an empty or "Not Found" answer is a per-symbol
//! `NoData` outcome, anything that says the service itself is unusable is a
//! `ProviderError`.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{FetchOutcome, ProviderError, SeriesFetcher};
use crate::config::ProviderConfig;
use crate::domain::{DateRange, PricePoint, PriceSeries, Symbol};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

const NOT_FOUND_CODE: &str = "Not Found";

/// Yahoo Finance fetcher.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout: Duration,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Build the chart API URL for a symbol and closed timestamp range.
    fn chart_url(&self, symbol: &Symbol, start_ts: i64, end_ts: i64) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::InvalidRequest(format!("base url '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::InvalidRequest(format!("base url '{}' cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol.as_str()]);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }

    fn timed_out(&self, symbol: &Symbol) -> FetchOutcome {
        warn!(%symbol, timeout_secs = self.timeout.as_secs(), "request timed out, treating as no data");
        FetchOutcome::no_data(format!("timed out after {}s", self.timeout.as_secs()))
    }
}

/// Convert the run's date strings into the closed `[start 00:00:00, end 23:59:59]` UTC window.
fn period_bounds(range: &DateRange) -> Result<(i64, i64), ProviderError> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| ProviderError::InvalidRequest(format!("date '{s}': {e}")))
    };
    let start = parse(&range.start)?;
    let end = parse(&range.end)?;
    if end < start {
        return Err(ProviderError::InvalidRequest(format!(
            "end date {end} precedes start date {start}"
        )));
    }
    let at = |date: NaiveDate, h, m, s| {
        date.and_hms_opt(h, m, s)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| ProviderError::InvalidRequest(format!("date '{date}' out of range")))
    };
    Ok((at(start, 0, 0, 0)?, at(end, 23, 59, 59)?))
}

/// Parse the chart API response into a fetch outcome.
fn parse_response(symbol: &Symbol, resp: ChartResponse) -> Result<FetchOutcome, ProviderError> {
    if let Some(err) = resp.chart.error {
        return chart_error_outcome(err);
    }
    let Some(results) = resp.chart.result else {
        return Ok(FetchOutcome::no_data("empty result with no error"));
    };

    let Some(data) = results.into_iter().next() else {
        return Ok(FetchOutcome::no_data("result array is empty"));
    };

    let Some(timestamps) = data.timestamp else {
        return Ok(FetchOutcome::no_data("no trading days in range"));
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ResponseFormat(format!("no quote data for {symbol}")))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);
    if adj_closes.is_none() {
        warn!(%symbol, "response carries no adjusted closes");
    }

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let mut points = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| ProviderError::ResponseFormat(format!("invalid timestamp: {ts}")))?;

        let row_is_void = quote.open.get(i).copied().flatten().is_none()
            && quote.high.get(i).copied().flatten().is_none()
            && quote.low.get(i).copied().flatten().is_none()
            && quote.close.get(i).copied().flatten().is_none()
            && quote.volume.get(i).copied().flatten().is_none();
        let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

        // Holidays/non-trading days come back as all-null rows
        if row_is_void && adj_close.is_none() {
            continue;
        }

        points.push(PricePoint { date, adj_close });
    }

    Ok(FetchOutcome::from_series(PriceSeries::new(symbol.clone(), points)))
}

/// Only "Not Found" names a symbol problem; any other chart error code is the
/// provider refusing the session (e.g. "Unauthorized" for a stale crumb).
fn chart_error_outcome(err: ChartError) -> Result<FetchOutcome, ProviderError> {
    if err.code.eq_ignore_ascii_case(NOT_FOUND_CODE) {
        Ok(FetchOutcome::no_data(describe(&err)))
    } else {
        Err(ProviderError::Rejected(describe(&err)))
    }
}

/// How a failed send is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportFailure {
    Unreachable,
    TimedOut,
    Other,
}

impl TransportFailure {
    /// A connect timeout sets both flags; it means the provider is unreachable.
    fn classify(is_connect: bool, is_timeout: bool) -> Self {
        if is_connect {
            TransportFailure::Unreachable
        } else if is_timeout {
            TransportFailure::TimedOut
        } else {
            TransportFailure::Other
        }
    }
}

fn describe(err: &ChartError) -> String {
    match &err.description {
        Some(d) => format!("{}: {d}", err.code),
        None => err.code.clone(),
    }
}

impl SeriesFetcher for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &Symbol, range: &DateRange) -> Result<FetchOutcome, ProviderError> {
        let (start_ts, end_ts) = period_bounds(range)?;
        let url = self.chart_url(symbol, start_ts, end_ts)?;
        debug!(%symbol, %url, "requesting chart");

        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) => {
                return match TransportFailure::classify(e.is_connect(), e.is_timeout()) {
                    TransportFailure::Unreachable => Err(ProviderError::Unreachable(e.to_string())),
                    TransportFailure::TimedOut => Ok(self.timed_out(symbol)),
                    TransportFailure::Other => Err(ProviderError::Client(e.to_string())),
                }
            }
        };

        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Blocked);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = match resp.text() {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Ok(self.timed_out(symbol)),
            Err(e) => return Err(ProviderError::Client(e.to_string())),
        };

        if status == StatusCode::NOT_FOUND {
            let reason = match serde_json::from_str::<ChartResponse>(&body) {
                Ok(ChartResponse {
                    chart: ChartResult { error: Some(err), .. },
                }) => describe(&err),
                _ => "symbol not found".to_string(),
            };
            return Ok(FetchOutcome::no_data(reason));
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        let chart: ChartResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::ResponseFormat(format!("failed to parse response for {symbol}: {e}"))
        })?;
        parse_response(symbol, chart)
    }
}
