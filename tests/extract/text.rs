use crate::common::{page, read_fixture};
use yolostocks_rs::Provenance;
use yolostocks_rs::extract::Strategy;
use yolostocks_rs::extract::strategies::{TextHit, TextPatternScan, is_value_token, scan_text};

#[test]
fn gme_line_yields_ticker_and_four_tokens() {
    let hits = scan_text("GME 1432 Bullish 25.43 +5.2%");
    assert_eq!(
        hits,
        vec![TextHit {
            ticker: "GME".into(),
            tokens: vec!["1432".into(), "Bullish".into(), "25.43".into(), "+5.2%".into()],
        }]
    );
}

#[tokio::test]
async fn text_page_without_table_goes_through_text_strategy() {
    let page = page(&read_fixture("text_only.html"));
    let result = TextPatternScan.attempt(&page).await.unwrap().expect("rows");

    assert_eq!(result.provenance, Provenance::TextPattern);
    assert_eq!(result.tickers(), vec!["GME", "AMC", "TSLA"]);
    let gme = &result.records[0];
    assert_eq!(gme.get("rank"), Some("1"));
    assert_eq!(gme.get("mentions"), Some("1432"));
    assert_eq!(gme.get("sentiment"), Some("Bullish"));
    assert_eq!(gme.get("price"), Some("25.43"));
    assert_eq!(gme.get("change"), Some("+5.2%"));
}

#[test]
fn stoplist_and_prose_are_ignored() {
    let text = "\
        HTML CSS API 2024\n\
        Powered by JSON over HTTPS\n\
        TOP 15 WSB\n\
        NVDA 876\n\
        NVDA 999\n\
        PLTR\n\
        I think so";
    let tickers: Vec<String> = scan_text(text).into_iter().map(|h| h.ticker).collect();
    assert_eq!(tickers, vec!["NVDA", "PLTR"]);
}

#[test]
fn value_tokens() {
    for ok in ["1432", "1,432", "$25.43", "+5.2%", "-15.3%", "3.4K", "bearish", "Neutral"] {
        assert!(is_value_token(ok), "{ok} should count");
    }
    for bad in ["GME", "%", "$", "abc", "12a", "-", "Bull"] {
        assert!(!is_value_token(bad), "{bad} should not count");
    }
}

#[test]
fn at_most_fifteen_hits() {
    let text: String = (0..40u8)
        .map(|i| format!("{}{} {}\n", (b'A' + i % 26) as char, (b'A' + i / 26) as char, i))
        .collect();
    assert_eq!(scan_text(&text).len(), 15);
}
