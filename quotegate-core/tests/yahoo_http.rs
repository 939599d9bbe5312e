//! HTTP-level tests for the Yahoo Finance fetcher against a mock server.
//!
//! Verifies the split between per-symbol "no data" outcomes (run continues)
//! and provider failures (run aborts).

use mockito::Matcher;
use quotegate_core::data::{FetchOutcome, ProviderError, SeriesFetcher, YahooProvider};
use quotegate_core::{DateRange, ProviderConfig, Symbol};
use std::io::Write;
use std::time::Duration;

const CHART_OK: &str = r#"{"chart":{"result":[{
    "meta":{"symbol":"AAPL","gmtoffset":-18000},
    "timestamp":[1704205800,1704292200,1704378600],
    "indicators":{
        "quote":[{"open":[187.15,184.22,182.15],"high":[188.44,185.88,183.09],"low":[183.89,183.43,180.88],"close":[185.64,184.25,181.91],"volume":[82488700,58414500,71983600]}],
        "adjclose":[{"adjclose":[184.938217,183.553482,181.222321]}]
    }}],"error":null}}"#;

const CHART_NOT_FOUND: &str =
    r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

const CHART_INVALID_CRUMB: &str =
    r#"{"chart":{"result":null,"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#;

fn provider(server: &mockito::Server) -> YahooProvider {
    YahooProvider::new(&ProviderConfig {
        base_url: server.url(),
        timeout_secs: 5,
        ..ProviderConfig::default()
    })
    .unwrap()
}

fn range() -> DateRange {
    DateRange::new("2024-01-02", "2024-01-04")
}

fn chart_path(symbol: &str) -> Matcher {
    Matcher::Regex(format!("^/v8/finance/chart/{}", regex_escape(symbol)))
}

fn regex_escape(s: &str) -> String {
    s.replace('.', r"\.")
}

#[test]
fn successful_chart_yields_series() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("interval".into(), "1d".into()),
            Matcher::UrlEncoded("includeAdjustedClose".into(), "true".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CHART_OK)
        .create();

    let outcome = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap();

    mock.assert();
    let FetchOutcome::Series(series) = outcome else {
        panic!("expected a series, got {outcome:?}");
    };
    assert_eq!(series.len(), 3);
    assert_eq!(series.points[0].date.to_string(), "2024-01-02");
    assert_eq!(series.points[2].adj_close, Some(181.222321));
}

#[test]
fn not_found_is_no_data() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("OIBR3.SA"))
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(CHART_NOT_FOUND)
        .create();

    let outcome = provider(&server).fetch(&Symbol::from("OIBR3.SA"), &range()).unwrap();
    assert!(matches!(outcome, FetchOutcome::NoData { .. }));
}

#[test]
fn rate_limit_is_fatal_and_reports_retry_after() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "7")
        .create();

    let err = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited { retry_after_secs: 7 }));
}

#[test]
fn forbidden_is_fatal() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(403)
        .create();

    let err = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::Blocked));
}

#[test]
fn server_error_is_fatal() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(502)
        .create();

    let err = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::Http { status: 502, .. }));
}

#[test]
fn unauthorized_chart_error_is_fatal_not_no_data() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(CHART_INVALID_CRUMB)
        .create();

    let err = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::Http { status: 401, .. }));
}

#[test]
fn bad_request_chart_error_is_fatal_not_no_data() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#)
        .create();

    let err = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::Http { status: 400, .. }));
}

#[test]
fn chart_error_on_success_status_is_rejected() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(CHART_INVALID_CRUMB)
        .create();

    let err = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::Rejected(_)));
}

#[test]
fn slow_response_times_out_as_no_data() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_secs(3));
            w.write_all(CHART_OK.as_bytes())
        })
        .create();

    let provider = YahooProvider::new(&ProviderConfig {
        base_url: server.url(),
        timeout_secs: 1,
        ..ProviderConfig::default()
    })
    .unwrap();

    let outcome = provider.fetch(&Symbol::from("AAPL"), &range()).unwrap();
    assert!(matches!(outcome, FetchOutcome::NoData { .. }));
}

#[test]
fn garbage_body_is_a_format_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", chart_path("AAPL"))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>consent wall</html>")
        .create();

    let err = provider(&server).fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::ResponseFormat(_)));
}

#[test]
fn no_request_is_sent_for_an_invalid_date() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", Matcher::Any).expect(0).create();

    let err = provider(&server)
        .fetch(&Symbol::from("AAPL"), &DateRange::new("2024-02-30", "2024-03-01"))
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidRequest(_)));
    mock.assert();
}

#[test]
fn refused_connection_is_unreachable() {
    let provider = YahooProvider::new(&ProviderConfig {
        base_url: "http://127.0.0.1:1".into(),
        timeout_secs: 5,
        ..ProviderConfig::default()
    })
    .unwrap();

    let err = provider.fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::Unreachable(_)));
}

#[test]
fn unroutable_provider_is_unreachable_even_when_connect_times_out() {
    let provider = YahooProvider::new(&ProviderConfig {
        base_url: "http://10.255.255.1".into(),
        timeout_secs: 1,
        ..ProviderConfig::default()
    })
    .unwrap();

    let err = provider.fetch(&Symbol::from("AAPL"), &range()).unwrap_err();
    assert!(matches!(err, ProviderError::Unreachable(_)));
}
