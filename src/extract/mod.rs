//! The extraction chain.
//!
//! A page is handed to each [`Strategy`] in order. The first one that returns rows
//! wins; a strategy that errors is logged and skipped, so a broken API probe never
//! masks a table that is sitting right there in the markup.

pub mod helpers;
pub mod strategies;
pub mod utils;

use crate::core::{ExtractionResult, Provenance, YsClient, YsError};
use crate::fetch::Page;
use futures::future::BoxFuture;
use strategies::{DemoFallback, EmbeddedState, EndpointProbe, TableScan, TextPatternScan};
use tracing::{debug, info, warn};

/// One extraction heuristic.
///
/// `Ok(None)` means "nothing here, try the next one". `Err` means the strategy
/// found something it could not use (bad status, malformed JSON) and is logged
/// the same way.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn provenance(&self) -> Provenance;

    fn attempt<'a>(
        &'a self,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Option<ExtractionResult>, YsError>>;
}

/// Ordered list of strategies.
pub struct ExtractorChain {
    strategies: Vec<Box<dyn Strategy>>,
}

impl ExtractorChain {
    /// A chain of exactly these strategies, in this order.
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// The standard chain for `client`: probe, embedded state, table, text.
    pub fn builder(client: &YsClient) -> ChainBuilder {
        ChainBuilder::new(client)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run the strategies until one yields rows.
    ///
    /// # Errors
    /// [`YsError::ExtractionEmpty`] when every strategy came up empty or failed.
    pub async fn extract(&self, page: &Page) -> Result<ExtractionResult, YsError> {
        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), "trying strategy");
            match strategy.attempt(page).await {
                Ok(Some(result)) if !result.is_empty() => {
                    info!(
                        strategy = strategy.name(),
                        provenance = %result.provenance,
                        rows = result.len(),
                        "extraction succeeded"
                    );
                    return Ok(result);
                }
                Ok(_) => debug!(strategy = strategy.name(), "no rows"),
                Err(e) => warn!(strategy = strategy.name(), error = %e, "strategy failed"),
            }
        }
        Err(YsError::ExtractionEmpty)
    }
}

/// Toggles for the standard chain. Everything except the demo fallback is on by default.
pub struct ChainBuilder {
    client: YsClient,
    endpoint_probe: bool,
    embedded_state: bool,
    table_scan: bool,
    text_pattern: bool,
    demo_fallback: bool,
    extra: Vec<Box<dyn Strategy>>,
}

impl ChainBuilder {
    fn new(client: &YsClient) -> Self {
        Self {
            client: client.clone(),
            endpoint_probe: true,
            embedded_state: true,
            table_scan: true,
            text_pattern: true,
            demo_fallback: false,
            extra: Vec::new(),
        }
    }

    pub fn endpoint_probe(mut self, on: bool) -> Self {
        self.endpoint_probe = on;
        self
    }

    pub fn embedded_state(mut self, on: bool) -> Self {
        self.embedded_state = on;
        self
    }

    pub fn table_scan(mut self, on: bool) -> Self {
        self.table_scan = on;
        self
    }

    pub fn text_pattern(mut self, on: bool) -> Self {
        self.text_pattern = on;
        self
    }

    /// Append the fabricated demo rows as a last resort. Off unless asked for.
    pub fn demo_fallback(mut self, on: bool) -> Self {
        self.demo_fallback = on;
        self
    }

    /// Add a custom strategy after the built-in heuristics (before the demo fallback).
    pub fn push(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.extra.push(strategy);
        self
    }

    pub fn build(self) -> ExtractorChain {
        let mut chain: Vec<Box<dyn Strategy>> = Vec::new();
        if self.endpoint_probe {
            chain.push(Box::new(EndpointProbe::new(self.client)));
        }
        if self.embedded_state {
            chain.push(Box::new(EmbeddedState));
        }
        if self.table_scan {
            chain.push(Box::new(TableScan));
        }
        if self.text_pattern {
            chain.push(Box::new(TextPatternScan));
        }
        chain.extend(self.extra);
        if self.demo_fallback {
            chain.push(Box::new(DemoFallback));
        }
        ExtractorChain::new(chain)
    }
}
