use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::fmt;

/// Hard cap on records per extraction (the board is a top 15).
pub const MAX_RECORDS: usize = 15;

/* ----- RECORDS ----- */

/// Canonical view over a record's fields, independent of the header text the
/// site happened to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Rank,
    Ticker,
    Mentions,
    Sentiment,
    Price,
    Change,
    Volume,
    /// Cells that did not fit any named column.
    Extra,
}

impl Field {
    /// Positional order used when a table has no header row.
    pub const POSITIONAL: [Field; 7] = [
        Field::Rank,
        Field::Ticker,
        Field::Mentions,
        Field::Sentiment,
        Field::Price,
        Field::Change,
        Field::Volume,
    ];

    /// The synthesized field name for this column.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Rank => "rank",
            Field::Ticker => "ticker",
            Field::Mentions => "mentions",
            Field::Sentiment => "sentiment",
            Field::Price => "price",
            Field::Change => "change",
            Field::Volume => "volume",
            Field::Extra => "extra",
        }
    }

    /// Map a header / JSON key onto a canonical field, if it is one we know.
    pub fn from_name(name: &str) -> Option<Field> {
        let trimmed = name.trim();
        if trimmed == "#" {
            return Some(Field::Rank);
        }
        let key: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let field = match key.as_str() {
            "rank" | "no" | "pos" | "position" => Field::Rank,
            "ticker" | "symbol" | "stock" | "tickersymbol" => Field::Ticker,
            "mentions" | "mentioncount" | "count" | "comments" | "posts" => Field::Mentions,
            "sentiment" | "mood" | "bullbear" => Field::Sentiment,
            "price" | "last" | "lastprice" | "close" => Field::Price,
            "change" | "changepct" | "changepercent" | "pct" | "percentchange" | "chg" => {
                Field::Change
            }
            "volume" | "vol" => Field::Volume,
            "extra" | "data" => Field::Extra,
            _ => return None,
        };
        Some(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ticker row: field name to string value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerRecord {
    fields: Vec<(String, String)>,
}

impl TickerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field. New names are appended, existing ones keep their position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value stored under an exact field name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value for a canonical field, whatever the header called it.
    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| Field::from_name(n) == Some(field))
            .map(|(_, v)| v.as_str())
    }

    pub fn ticker(&self) -> Option<&str> {
        self.field(Field::Ticker)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for TickerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/* ----- EXTRACTION ----- */

/// Which heuristic produced an [`ExtractionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    EndpointProbe,
    EmbeddedState,
    TableScan,
    TextPattern,
    /// Fabricated demo data. Never real.
    Fallback,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::EndpointProbe => "endpoint_probe",
            Provenance::EmbeddedState => "embedded_state",
            Provenance::TableScan => "table_scan",
            Provenance::TextPattern => "text_pattern",
            Provenance::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Up to [`MAX_RECORDS`] records plus where they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub provenance: Provenance,
    pub scraped_at: DateTime<Utc>,
    /// URL that supplied the data, when it differs from the page (endpoint probes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub records: Vec<TickerRecord>,
}

impl ExtractionResult {
    /// Wrap records, truncating to [`MAX_RECORDS`].
    pub fn new(provenance: Provenance, mut records: Vec<TickerRecord>) -> Self {
        records.truncate(MAX_RECORDS);
        Self {
            provenance,
            scraped_at: Utc::now(),
            source: None,
            records,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// `None` when there is nothing in it, so strategies can `?`-chain on emptiness.
    pub fn non_empty(self) -> Option<Self> {
        if self.records.is_empty() { None } else { Some(self) }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_fabricated(&self) -> bool {
        self.provenance == Provenance::Fallback
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.records.iter().filter_map(TickerRecord::ticker).collect()
    }
}
