use crate::core::{MAX_RECORDS, TickerRecord};
use serde_json::Value;

/// Keys under which JSON payloads are known (or guessed) to carry the ticker list.
pub const LIST_KEYS: [&str; 7] = [
    "tickers",
    "data",
    "stocks",
    "wsb",
    "wallstreetbets",
    "top",
    "trending",
];

pub fn truncate(s: &str, n: usize) -> String {
    if s.len() <= n {
        s.to_string()
    } else {
        let mut cut = n;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        let mut out = String::with_capacity(cut + 16);
        out.push_str(&s[..cut]);
        out.push_str(" …[trunc]");
        out
    }
}

/// Records from a top-level JSON body: either the array itself, or the first
/// array found under one of [`LIST_KEYS`] on the root object.
pub fn records_from_json(v: &Value) -> Vec<TickerRecord> {
    match v {
        Value::Array(items) => records_from_items(items),
        Value::Object(map) => LIST_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(|items| records_from_items(items))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Depth-first search for the first non-empty ticker-ish array under a known key.
pub fn find_ticker_list(v: &Value) -> Option<&Vec<Value>> {
    match v {
        Value::Object(map) => {
            for key in LIST_KEYS {
                if let Some(Value::Array(items)) = map.get(key)
                    && items.iter().any(is_record_like)
                {
                    return Some(items);
                }
            }
            for child in map.values() {
                if let Some(found) = find_ticker_list(child) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(arr) => {
            for child in arr {
                if let Some(found) = find_ticker_list(child) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

fn is_record_like(v: &Value) -> bool {
    match v {
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    }
}

/// Turn list items into records. Objects keep their keys; bare strings become `{ticker}`.
pub fn records_from_items(items: &[Value]) -> Vec<TickerRecord> {
    items
        .iter()
        .filter_map(record_from_item)
        .take(MAX_RECORDS)
        .collect()
}

fn record_from_item(item: &Value) -> Option<TickerRecord> {
    match item {
        Value::Object(map) if !map.is_empty() => {
            let mut rec = TickerRecord::new();
            for (k, v) in map {
                rec.insert(k.as_str(), value_to_cell(v));
            }
            Some(rec)
        }
        Value::String(s) if !s.trim().is_empty() => {
            Some(TickerRecord::new().with("ticker", s.trim()))
        }
        _ => None,
    }
}

fn value_to_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
