use crate::common::{read_fixture, table_html};
use yolostocks_rs::extract::strategies::{MAX_TABLE_ROWS, TableScan};
use yolostocks_rs::{Field, Provenance};

#[test]
fn sixteen_row_fixture_gives_fifteen_records_keyed_by_header() {
    let html = read_fixture("top15_table.html");
    let result = TableScan::scan(&html).expect("rows");

    assert_eq!(result.provenance, Provenance::TableScan);
    assert_eq!(result.len(), 15);
    for rec in &result.records {
        let names: Vec<&str> = rec.names().collect();
        assert_eq!(names, vec!["Rank", "Ticker", "Mentions", "Sentiment", "Change %"]);
    }
    assert_eq!(result.records[0].get("Ticker"), Some("GME"));
    assert_eq!(result.records[0].get("Mentions"), Some("1,432"));
    assert_eq!(result.records[0].field(Field::Change), Some("+5.2%"));
    assert_eq!(result.records[14].get("Ticker"), Some("HOOD"));
    let ranks: Vec<&str> = result.records.iter().map(|r| r.get("Rank").unwrap()).collect();
    let expected: Vec<String> = (1..=15).map(|i| i.to_string()).collect();
    assert_eq!(ranks, expected);
}

#[test]
fn rows_are_capped_and_blank_rows_skipped() {
    let mut rows: Vec<Vec<&str>> = vec![vec!["Rank", "Ticker"], vec!["", " "]];
    let numbers: Vec<String> = (1..=30).map(|i| i.to_string()).collect();
    for n in &numbers {
        rows.push(vec![n.as_str(), "XYZ"]);
    }
    let raw = TableScan::rows(&table_html(&rows));
    assert_eq!(raw.len(), MAX_TABLE_ROWS);
    assert_eq!(raw[1], vec!["1".to_string(), "XYZ".to_string()]);

    let result = TableScan::scan(&table_html(&rows)).expect("rows");
    assert_eq!(result.len(), 15);
}

#[test]
fn aria_grid_is_used_when_there_is_no_table() {
    let html = r#"<div role="grid">
        <div role="row">
            <span role="columnheader">Ticker</span><span role="columnheader">Mentions</span>
        </div>
        <div role="row"><span role="cell">GME</span><span role="cell">1432</span></div>
        <div role="row"><span role='gridcell'>AMC</span><span role='gridcell'>1156</span></div>
    </div>"#;
    let result = TableScan::scan(html).expect("rows");
    assert_eq!(result.tickers(), vec!["GME", "AMC"]);
    assert_eq!(result.records[1].get("Mentions"), Some("1156"));
}

#[test]
fn empty_tables_are_skipped_for_the_next_one() {
    let html = format!(
        "<table><tr><td> </td></tr></table>{}",
        table_html(&[vec!["1", "GME", "1432"]])
    );
    let result = TableScan::scan(&html).expect("rows");
    assert_eq!(result.records[0].get("ticker"), Some("GME"));
    assert_eq!(result.records[0].get("mentions"), Some("1432"));
}

#[test]
fn no_markup_no_rows() {
    assert!(TableScan::scan("<p>GME 1432</p>").is_none());
}
