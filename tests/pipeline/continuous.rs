use crate::common::{client_for, read_fixture};
use httpmock::{Method::GET, MockServer};
use std::time::Duration;
use tokio::sync::watch;
use yolostocks_rs::persist::csv::parse_rows;
use yolostocks_rs::{OutputSink, Pipeline, Runner, Schedule, StopReason};

#[tokio::test]
async fn each_success_appends_rows_under_one_header() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(read_fixture("top15_table.html"));
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &[]))
        .build()
        .unwrap();
    let runner = Runner::new(pipeline, OutputSink::new(dir.path()));
    let schedule = Schedule::default()
        .interval(Duration::from_millis(20))
        .duration(Some(Duration::from_millis(150)));
    let (_tx, mut rx) = watch::channel(false);

    let summary = runner.run_continuous(&schedule, &mut rx).await.unwrap();
    assert_eq!(summary.reason, StopReason::DurationElapsed);
    assert!(summary.successes >= 2, "{summary:?}");
    assert_eq!(summary.failures, 0);
    page.assert_hits(summary.iterations as usize);

    let rows = parse_rows(&std::fs::read_to_string(runner.sink().csv_path()).unwrap(), ',');
    assert_eq!(rows[0][0], "scraped_at");
    assert_eq!(rows.iter().filter(|r| r[0] == "scraped_at").count(), 1);
    assert_eq!(rows.len(), 1 + 15 * summary.successes as usize);
}

#[tokio::test]
async fn demo_rows_count_as_failures_and_are_not_written() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("<html></html>");
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &[]))
        .demo_mode(true)
        .build()
        .unwrap();
    let runner = Runner::new(pipeline, OutputSink::new(dir.path()));
    let schedule = Schedule::default().interval(Duration::from_millis(5));
    let (_tx, mut rx) = watch::channel(false);

    let summary = runner.run_continuous(&schedule, &mut rx).await.unwrap();
    assert_eq!(summary.reason, StopReason::TooManyFailures);
    assert_eq!(summary.iterations, 3);
    assert!(!runner.sink().csv_path().exists());
}

#[tokio::test]
async fn cookies_are_shared_within_an_iteration_but_not_across_them() {
    let server = MockServer::start();
    let fresh = server.mock(|when, then| {
        when.method(GET).path("/").header_missing("cookie");
        then.status(200)
            .header("set-cookie", "sid=abc; Path=/")
            .body(read_fixture("top15_table.html"));
    });
    let replayed = server.mock(|when, then| {
        when.method(GET).path("/").header_exists("cookie");
        then.status(200).body(read_fixture("top15_table.html"));
    });
    let probe = server.mock(|when, then| {
        when.method(GET).path("/api/tickers").header("cookie", "sid=abc");
        then.status(404);
    });

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::builder()
        .client(client_for(&server, &["/api/tickers"]))
        .build()
        .unwrap();
    let runner = Runner::new(pipeline, OutputSink::new(dir.path()));
    let schedule = Schedule::default()
        .interval(Duration::from_millis(20))
        .duration(Some(Duration::from_millis(200)));
    let (_tx, mut rx) = watch::channel(false);

    let summary = runner.run_continuous(&schedule, &mut rx).await.unwrap();
    assert!(summary.iterations >= 2, "{summary:?}");
    replayed.assert_hits(0);
    fresh.assert_hits(summary.iterations as usize);
    probe.assert_hits(summary.iterations as usize);
}
