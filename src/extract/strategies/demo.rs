use crate::core::{ExtractionResult, Provenance, YsError};
use crate::extract::Strategy;
use crate::fetch::Page;
use crate::normalize::normalize_rows;
use futures::future::BoxFuture;
use tracing::warn;

const DEMO_HEADER: [&str; 6] = ["Rank", "Ticker", "Mentions", "Sentiment", "Price", "Change"];

/// Fabricated sample board. Only ever used in demo mode.
pub const DEMO_ROWS: [[&str; 6]; 15] = [
    ["1", "GME", "1432", "Bullish", "$25.43", "+5.2%"],
    ["2", "AMC", "1156", "Bullish", "$4.87", "+3.1%"],
    ["3", "TSLA", "987", "Mixed", "$242.31", "-1.2%"],
    ["4", "NVDA", "876", "Bullish", "$487.92", "+2.8%"],
    ["5", "SPY", "743", "Bearish", "$445.23", "-0.5%"],
    ["6", "AAPL", "651", "Bullish", "$178.45", "+0.8%"],
    ["7", "AMD", "543", "Bullish", "$112.34", "+1.9%"],
    ["8", "BBBY", "487", "Mixed", "$0.08", "-15.3%"],
    ["9", "PLTR", "423", "Bullish", "$15.67", "+4.2%"],
    ["10", "BB", "387", "Mixed", "$3.21", "+0.3%"],
    ["11", "SOFI", "342", "Bullish", "$7.89", "+2.1%"],
    ["12", "F", "298", "Mixed", "$12.45", "-0.7%"],
    ["13", "COIN", "276", "Bearish", "$67.89", "-3.2%"],
    ["14", "RIVN", "234", "Bearish", "$18.76", "-2.4%"],
    ["15", "META", "198", "Bullish", "$312.45", "+1.5%"],
];

/// Always succeeds with [`DEMO_ROWS`], tagged [`Provenance::Fallback`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoFallback;

impl DemoFallback {
    pub fn result() -> ExtractionResult {
        let rows: Vec<Vec<String>> = std::iter::once(&DEMO_HEADER)
            .chain(DEMO_ROWS.iter())
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect();
        ExtractionResult::new(Provenance::Fallback, normalize_rows(&rows))
    }
}

impl Strategy for DemoFallback {
    fn name(&self) -> &'static str {
        "demo_fallback"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Fallback
    }

    fn attempt<'a>(
        &'a self,
        _page: &'a Page,
    ) -> BoxFuture<'a, Result<Option<ExtractionResult>, YsError>> {
        warn!("no live data found; emitting fabricated DEMO rows");
        Box::pin(async { Ok(Some(Self::result())) })
    }
}
