use std::fs;
use yolostocks_rs::persist::csv::{parse_rows, write_row};
use yolostocks_rs::{CsvMode, ExtractionResult, OutputSink, Provenance, TickerRecord};

fn result(tickers: &[&str]) -> ExtractionResult {
    let records = tickers
        .iter()
        .enumerate()
        .map(|(i, t)| {
            TickerRecord::new()
                .with("Rank", (i + 1).to_string())
                .with("Ticker", *t)
                .with("Note", "a, \"quoted\" note")
        })
        .collect();
    ExtractionResult::new(Provenance::TableScan, records)
}

#[test]
fn append_writes_exactly_one_header() {
    let dir = tempfile::tempdir().unwrap();
    let sink = OutputSink::new(dir.path());

    let iterations = 4;
    let batch = ["GME", "AMC", "TSLA"];
    for _ in 0..iterations {
        sink.write(&result(&batch), CsvMode::Append).unwrap();
    }

    let text = fs::read_to_string(sink.csv_path()).unwrap();
    let rows = parse_rows(&text, ',');
    assert_eq!(rows.len(), 1 + iterations * batch.len());
    assert_eq!(rows[0], vec!["Rank", "Ticker", "Note"]);
    assert_eq!(rows.iter().filter(|r| r[0] == "Rank").count(), 1);
    assert_eq!(rows[1][2], "a, \"quoted\" note");
}

#[test]
fn overwrite_replaces_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let sink = OutputSink::new(dir.path()).csv_name("board.csv");
    sink.write(&result(&["GME", "AMC"]), CsvMode::Overwrite).unwrap();
    sink.write(&result(&["NVDA"]), CsvMode::Overwrite).unwrap();

    let rows = parse_rows(&fs::read_to_string(dir.path().join("board.csv")).unwrap(), ',');
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][1], "NVDA");
}

#[test]
fn timestamped_rows_lead_with_scraped_at_and_reuse_header_on_append() {
    let dir = tempfile::tempdir().unwrap();
    let sink = OutputSink::new(dir.path()).timestamped(true);

    let first = result(&["GME"]);
    sink.write(&first, CsvMode::Append).unwrap();
    // a later batch with an extra column keeps the first layout
    let mut second = result(&["AMC"]);
    second.records[0].insert("Bonus", "x");
    sink.write(&second, CsvMode::Append).unwrap();

    let rows = parse_rows(&fs::read_to_string(sink.csv_path()).unwrap(), ',');
    assert_eq!(rows[0], vec!["scraped_at", "Rank", "Ticker", "Note"]);
    assert_eq!(rows[1][0], first.scraped_at.to_rfc3339());
    assert_eq!(rows[2][0], second.scraped_at.to_rfc3339());
    assert_eq!(rows[2][2], "AMC");
    assert_eq!(rows[2].len(), 4);
}

#[test]
fn append_matches_columns_by_field_when_key_spellings_differ() {
    let dir = tempfile::tempdir().unwrap();
    let sink = OutputSink::new(dir.path()).timestamped(true);

    let table = ExtractionResult::new(
        Provenance::TableScan,
        vec![
            TickerRecord::new()
                .with("Rank", "1")
                .with("Ticker", "GME")
                .with("Mentions", "1432"),
        ],
    );
    let endpoint = ExtractionResult::new(
        Provenance::EndpointProbe,
        vec![
            TickerRecord::new()
                .with("rank", "2")
                .with("symbol", "AMC")
                .with("mentions", "1156"),
        ],
    );
    sink.write(&table, CsvMode::Append).unwrap();
    sink.write(&endpoint, CsvMode::Append).unwrap();

    let rows = parse_rows(&fs::read_to_string(sink.csv_path()).unwrap(), ',');
    assert_eq!(rows[0], vec!["scraped_at", "Rank", "Ticker", "Mentions"]);
    assert_eq!(rows[2][1..], ["2", "AMC", "1156"]);
}

#[test]
fn quoting_round_trips_through_the_parser() {
    let mut buf = Vec::new();
    let row = vec!["plain".to_string(), "with,comma".into(), "line\nbreak".into(), "".into()];
    write_row(&mut buf, &row, ',').unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text, "plain,\"with,comma\",\"line\nbreak\",\n");
    assert_eq!(parse_rows(&text, ','), vec![row]);
}
