use crate::core::{ExtractionResult, MAX_RECORDS, Provenance, YsError};
use crate::extract::Strategy;
use crate::fetch::Page;
use crate::normalize::normalize_rows;
use futures::future::BoxFuture;
use tracing::debug;

/// Upper-case words that look like symbols but never are.
pub const STOPLIST: [&str; 17] = [
    "HTML", "CSS", "API", "JSON", "GET", "POST", "PUT", "HTTP", "HTTPS", "USD", "USA", "NYSE",
    "URL", "WWW", "TOP", "WSB", "YOLO",
];

pub const SENTIMENT_LABELS: [&str; 4] = ["bullish", "bearish", "mixed", "neutral"];

/// A symbol found in running text with the value tokens that followed it on its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextHit {
    pub ticker: String,
    pub tokens: Vec<String>,
}

/// Last-resort scan of the visible text, one candidate per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPatternScan;

impl TextPatternScan {
    pub fn scan(text: &str) -> Option<ExtractionResult> {
        let rows: Vec<Vec<String>> = scan_text(text)
            .into_iter()
            .enumerate()
            .map(|(i, hit)| {
                let mut row = vec![(i + 1).to_string(), hit.ticker];
                row.extend(hit.tokens);
                row
            })
            .collect();
        ExtractionResult::new(Provenance::TextPattern, normalize_rows(&rows)).non_empty()
    }
}

/// Find up to [`MAX_RECORDS`] distinct symbols in `text`.
///
/// A line contributes its first non-stoplisted symbol when that symbol is followed
/// by at least one value token, or when the symbol is all the line holds.
pub fn scan_text(text: &str) -> Vec<TextHit> {
    let mut hits: Vec<TextHit> = Vec::new();
    for line in text.lines() {
        if hits.len() >= MAX_RECORDS {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((at, ticker)) = words
            .iter()
            .enumerate()
            .find_map(|(i, w)| symbol(w).map(|s| (i, s)))
        else {
            continue;
        };
        if hits.iter().any(|h| h.ticker == ticker) {
            continue;
        }
        let tokens: Vec<String> = words[at + 1..]
            .iter()
            .filter(|w| is_value_token(w))
            .map(|w| (*w).to_string())
            .collect();
        if tokens.is_empty() && words.len() > 1 {
            continue;
        }
        debug!(%ticker, tokens = tokens.len(), "text candidate");
        hits.push(TextHit { ticker, tokens });
    }
    hits
}

/// The word as a symbol: 1 to 5 ASCII capitals, optional `$` prefix, not stoplisted.
fn symbol(word: &str) -> Option<String> {
    let w = word.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '.' | '(' | ')' | '[' | ']'));
    let w = w.strip_prefix('$').unwrap_or(w);
    let ok = (1..=5).contains(&w.len()) && w.bytes().all(|b| b.is_ascii_uppercase());
    (ok && !STOPLIST.contains(&w)).then(|| w.to_string())
}

/// Numeric-looking (`1432`, `$25.43`, `+5.2%`, `1,204`, `3.4K`) or a sentiment label.
pub fn is_value_token(word: &str) -> bool {
    if SENTIMENT_LABELS.contains(&word.to_ascii_lowercase().as_str()) {
        return true;
    }
    let w = word.trim_start_matches(['+', '-']);
    let w = w.strip_prefix('$').unwrap_or(w);
    let w = w.strip_suffix('%').unwrap_or(w);
    let w = w
        .strip_suffix(['K', 'M', 'B', 'k', 'm', 'b'])
        .unwrap_or(w);
    w.starts_with(|c: char| c.is_ascii_digit())
        && w.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

impl Strategy for TextPatternScan {
    fn name(&self) -> &'static str {
        "text_pattern"
    }

    fn provenance(&self) -> Provenance {
        Provenance::TextPattern
    }

    fn attempt<'a>(
        &'a self,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Option<ExtractionResult>, YsError>> {
        Box::pin(async move { Ok(Self::scan(&page.text)) })
    }
}
