use crate::common::{client_for, read_fixture};
use httpmock::{Method::GET, MockServer};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use yolostocks_rs::persist::DEBUG_PAGE_FILE;
use yolostocks_rs::{OutputSink, Pipeline, Provenance, Runner, TransportMode, YsError};

#[tokio::test]
async fn table_page_end_to_end() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("content-type", "text/html")
            .body(read_fixture("top15_table.html"));
    });
    let probe = server.mock(|when, then| {
        when.method(GET).path("/api/tickers");
        then.status(404);
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &["/api/tickers"]))
        .debug_dir(dir.path())
        .build()
        .unwrap();
    assert_eq!(pipeline.transport_mode(), TransportMode::Http);

    let runner = Runner::new(pipeline, OutputSink::new(dir.path()));
    let result = runner.run_single(false).await.unwrap();

    page.assert();
    probe.assert();
    assert_eq!(result.provenance, Provenance::TableScan);
    assert_eq!(result.len(), 15);
    assert_eq!(result.records[0].get("Ticker"), Some("GME"));

    let csv = std::fs::read_to_string(runner.sink().csv_path()).unwrap();
    assert_eq!(csv.lines().count(), 16);
    assert!(csv.starts_with("Rank,Ticker,Mentions,Sentiment,Change %\n"));
    assert!(runner.sink().json_path().exists());
    assert!(!dir.path().join(DEBUG_PAGE_FILE).exists());
}

#[tokio::test]
async fn skip_probe_leaves_endpoints_alone() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(read_fixture("text_only.html"));
    });
    let probe = server.mock(|when, then| {
        when.method(GET).path("/api/tickers");
        then.status(200).body(r#"["NOPE"]"#);
    });

    let pipeline = Pipeline::builder()
        .client(client_for(&server, &["/api/tickers"]))
        .skip_probe(true)
        .build()
        .unwrap();
    let result = pipeline.scrape().await.unwrap();

    probe.assert_hits(0);
    assert_eq!(result.provenance, Provenance::TextPattern);
    assert_eq!(result.tickers(), vec!["GME", "AMC", "TSLA"]);
}

#[tokio::test]
async fn nothing_found_is_extraction_empty_and_dumps_the_page() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("<html><body><p>loading...</p></body></html>");
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &["/api/tickers"]))
        .debug_dir(dir.path())
        .build()
        .unwrap();
    let runner = Runner::new(pipeline, OutputSink::new(dir.path()));

    let err = runner.run_single(false).await.unwrap_err();
    assert!(matches!(err, YsError::ExtractionEmpty), "got {err}");
    let dumped = std::fs::read_to_string(dir.path().join(DEBUG_PAGE_FILE)).unwrap();
    assert!(dumped.contains("loading..."));
    assert!(!runner.sink().csv_path().exists());
}

#[tokio::test]
async fn demo_mode_emits_the_fifteen_row_fallback() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("<html><body></body></html>");
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &["/api/tickers", "/wsb.json"]))
        .demo_mode(true)
        .debug_dir(dir.path())
        .build()
        .unwrap();
    assert!(pipeline.is_demo());

    let result = pipeline.scrape().await.unwrap();
    assert_eq!(result.provenance, Provenance::Fallback);
    assert_eq!(result.len(), 15);
    assert_eq!(result.tickers().first(), Some(&"GME"));
    assert_eq!(result.tickers().last(), Some(&"META"));
    assert!(dir.path().join(DEBUG_PAGE_FILE).exists());
}

#[tokio::test]
async fn failed_page_fetch_still_probes_endpoints() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(503);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/tickers");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"tickers":[{"symbol":"GME"},{"symbol":"AMC"}]}"#);
    });

    let pipeline = Pipeline::builder()
        .client(client_for(&server, &["/api/tickers"]))
        .build()
        .unwrap();
    let result = pipeline.scrape().await.unwrap();
    assert_eq!(result.provenance, Provenance::EndpointProbe);
    assert_eq!(result.tickers(), vec!["GME", "AMC"]);
}

#[tokio::test]
async fn failed_page_fetch_with_nothing_else_reports_the_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(500);
    });

    let pipeline = Pipeline::builder()
        .client(client_for(&server, &["/api/tickers"]))
        .build()
        .unwrap();
    let err = pipeline.scrape().await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, YsError::Status { status: 500, .. }), "got {err}");
}

#[tokio::test]
async fn failed_fetch_keeps_the_previous_debug_page() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(502);
    });

    let dir = tempfile::tempdir().unwrap();
    let earlier = dir.path().join(DEBUG_PAGE_FILE);
    std::fs::write(&earlier, "<html>earlier capture</html>").unwrap();

    let pipeline = Pipeline::builder()
        .client(client_for(&server, &[]))
        .debug_dir(dir.path())
        .build()
        .unwrap();
    let err = pipeline.scrape().await.unwrap_err();
    assert!(err.is_transport(), "got {err}");
    assert_eq!(
        std::fs::read_to_string(&earlier).unwrap(),
        "<html>earlier capture</html>"
    );
}

#[tokio::test]
async fn demo_single_run_writes_only_the_demo_files() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("<html><body></body></html>");
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &[]))
        .demo_mode(true)
        .build()
        .unwrap();
    let runner = Runner::new(pipeline, OutputSink::new(dir.path()));
    let result = runner.run_single(false).await.unwrap();

    assert!(result.is_fabricated());
    assert!(!runner.sink().csv_path().exists());
    assert!(!runner.sink().json_path().exists());
    let csv = std::fs::read_to_string(runner.sink().demo_csv_path()).unwrap();
    assert_eq!(csv.lines().count(), 16);
}

#[tokio::test]
async fn interrupt_during_a_slow_fetch_returns_promptly_without_output() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .delay(Duration::from_secs(3))
            .body(read_fixture("top15_table.html"));
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &[]))
        .build()
        .unwrap();
    let runner = Runner::new(pipeline, OutputSink::new(dir.path()));
    let (tx, mut rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = tx.send(true);
    });

    let started = Instant::now();
    let out = runner.run_single_until(false, &mut rx).await.unwrap();
    assert!(out.is_none());
    assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
    assert!(!runner.sink().csv_path().exists());
}

#[tokio::test]
async fn scrape_until_without_interrupt_behaves_like_scrape() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(read_fixture("top15_table.html"));
    });

    let pipeline = Pipeline::builder()
        .client(client_for(&server, &[]))
        .build()
        .unwrap();
    let (_tx, mut rx) = watch::channel(false);
    let result = pipeline.scrape_until(&mut rx).await.unwrap().expect("rows");
    assert_eq!(result.provenance, Provenance::TableScan);
    assert_eq!(result.len(), 15);
}
