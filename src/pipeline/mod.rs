//! Fetch, extract and hand back one [`ExtractionResult`]; plus the single and
//! continuous drivers built on top of it.

pub mod runner;
pub mod schedule;

pub use runner::Runner;
pub use schedule::{FailureTracker, Iteration, RunSummary, Schedule, StopReason, drive};

use crate::core::{ExtractionResult, YsClient, YsError};
use crate::extract::ExtractorChain;
use crate::fetch::{BrowserFactory, Page, Transport, TransportMode};
use crate::persist::write_debug_page;
use schedule::shutdown_requested;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

/// A configured scrape: target, transport mode and extraction chain.
pub struct Pipeline {
    client: YsClient,
    target: Url,
    transport: TransportMode,
    browsers: BrowserFactory,
    chain: ExtractorChain,
    demo: bool,
    debug_dir: Option<PathBuf>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport
    }

    pub fn chain(&self) -> &ExtractorChain {
        &self.chain
    }

    pub fn client(&self) -> &YsClient {
        &self.client
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Open the configured transport. The caller owns it and must close it.
    pub async fn open_transport(&self) -> Result<Transport, YsError> {
        Transport::open(self.transport, &self.client, &self.browsers).await
    }

    /// One fetch + extract pass over an already open transport.
    ///
    /// A failed page fetch does not stop the chain; strategies that do not need the
    /// page (endpoint probing) still run. If nothing is found, the fetch error is
    /// returned when there was one, otherwise [`YsError::ExtractionEmpty`].
    ///
    /// Over HTTP each pass starts with an empty cookie jar.
    #[tracing::instrument(skip_all, fields(url = %self.target, transport = %transport.mode()))]
    pub async fn run_once(&self, transport: &mut Transport) -> Result<ExtractionResult, YsError> {
        if transport.mode() == TransportMode::Http {
            self.client.reset_session();
        }
        let (page, fetch_err) = match transport.fetch(&self.target).await {
            Ok(page) => (page, None),
            Err(e) => {
                warn!(error = %e, "page fetch failed; trying content-free strategies");
                (Page::empty(self.target.as_str(), transport.mode()), Some(e))
            }
        };

        match self.chain.extract(&page).await {
            Ok(result) => {
                if result.is_fabricated() {
                    warn!(rows = result.len(), "DEMO DATA: result is fabricated");
                    self.save_debug_page(&page);
                }
                Ok(result)
            }
            Err(YsError::ExtractionEmpty) => {
                self.save_debug_page(&page);
                Err(fetch_err.unwrap_or(YsError::ExtractionEmpty))
            }
            Err(e) => Err(e),
        }
    }

    /// Open a transport, run once, close it again.
    pub async fn scrape(&self) -> Result<ExtractionResult, YsError> {
        let mut transport = self.open_transport().await?;
        let out = self.run_once(&mut transport).await;
        transport.close().await;
        out
    }

    /// Like [`Pipeline::scrape`], but gives up as soon as `shutdown` flips to `true`.
    ///
    /// `Ok(None)` means interrupted. The transport is closed on every path.
    pub async fn scrape_until(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<ExtractionResult>, YsError> {
        let mut transport = tokio::select! {
            opened = self.open_transport() => opened?,
            _ = shutdown_requested(shutdown) => {
                warn!("interrupted while opening the transport");
                return Ok(None);
            }
        };
        let out = tokio::select! {
            r = self.run_once(&mut transport) => r.map(Some),
            _ = shutdown_requested(shutdown) => {
                warn!("interrupted; releasing transport");
                Ok(None)
            }
        };
        transport.close().await;
        out
    }

    fn save_debug_page(&self, page: &Page) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        if page.html.trim().is_empty() {
            debug!("no markup to dump; keeping any earlier debug page");
            return;
        }
        if let Err(e) = write_debug_page(dir, &page.html) {
            warn!(error = %e, "could not save debug page");
        }
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    client: Option<YsClient>,
    target: Option<Url>,
    transport: TransportMode,
    browsers: Option<BrowserFactory>,
    chain: Option<ExtractorChain>,
    skip_probe: bool,
    demo: bool,
    debug_dir: Option<PathBuf>,
}

impl PipelineBuilder {
    /// Use this client (and its probe settings). Default: `YsClient::new()`.
    pub fn client(mut self, client: YsClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Page to scrape. Default: the client's base URL.
    pub fn target(mut self, url: Url) -> Self {
        self.target = Some(url);
        self
    }

    pub fn transport(mut self, mode: TransportMode) -> Self {
        self.transport = mode;
        self
    }

    pub fn browsers(mut self, factory: BrowserFactory) -> Self {
        self.browsers = Some(factory);
        self
    }

    /// Replace the standard chain entirely. `skip_probe` and `demo_mode` then
    /// only affect logging and the debug dump.
    pub fn chain(mut self, chain: ExtractorChain) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn skip_probe(mut self, yes: bool) -> Self {
        self.skip_probe = yes;
        self
    }

    /// Append the fabricated fallback to the chain.
    pub fn demo_mode(mut self, yes: bool) -> Self {
        self.demo = yes;
        self
    }

    /// Where the page source is dumped when extraction fails. Default: nowhere.
    pub fn debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<Pipeline, YsError> {
        let client = match self.client {
            Some(c) => c,
            None => YsClient::new()?,
        };
        let target = self.target.unwrap_or_else(|| client.base_url().clone());
        let chain = match self.chain {
            Some(chain) => chain,
            None => ExtractorChain::builder(&client)
                .endpoint_probe(!self.skip_probe)
                .demo_fallback(self.demo)
                .build(),
        };
        info!(
            %target,
            transport = %self.transport,
            chain = ?chain.names(),
            demo = self.demo,
            "pipeline ready"
        );
        Ok(Pipeline {
            client,
            target,
            transport: self.transport,
            browsers: self.browsers.unwrap_or_default(),
            chain,
            demo: self.demo,
            debug_dir: self.debug_dir,
        })
    }
}
