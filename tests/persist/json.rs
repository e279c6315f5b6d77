use serde_json::Value;
use yolostocks_rs::extract::strategies::DemoFallback;
use yolostocks_rs::{CsvMode, ExtractionResult, OutputSink, Provenance, TickerRecord};

#[test]
fn snapshot_is_pretty_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let sink = OutputSink::new(dir.path().join("nested"));
    let res = ExtractionResult::new(
        Provenance::EndpointProbe,
        vec![TickerRecord::new().with("ticker", "GME").with("mentions", "1432")],
    )
    .with_source("https://yolostocks.live/api/tickers");
    sink.write(&res, CsvMode::Overwrite).unwrap();

    let text = std::fs::read_to_string(sink.json_path()).unwrap();
    assert!(text.contains("\n  \"provenance\": \"endpoint_probe\""));
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["source"], "https://yolostocks.live/api/tickers");
    let keys: Vec<&String> = v["records"][0].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["ticker", "mentions"]);
}

#[test]
fn demo_snapshot_is_labeled_and_kept_apart() {
    let dir = tempfile::tempdir().unwrap();
    let sink = OutputSink::new(dir.path());
    sink.write(&DemoFallback::result(), CsvMode::Overwrite).unwrap();

    assert!(!sink.json_path().exists());
    assert!(!sink.csv_path().exists());
    assert!(sink.demo_csv_path().exists());
    let text = std::fs::read_to_string(sink.demo_json_path()).unwrap();
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["provenance"], "fallback");
    assert!(v.get("source").is_none());
    assert_eq!(v["records"].as_array().unwrap().len(), 15);
}
