//! yolostocks-rs: scraper for the yolostocks.live top-15 WallStreetBets board.
//!
//! One page is fetched (plain HTTP or a headless Chromium-family browser), run
//! through an ordered chain of extraction heuristics, normalized into
//! [`TickerRecord`]s and written to CSV and JSON.
//!
//! ```no_run
//! # async fn demo() -> Result<(), yolostocks_rs::YsError> {
//! use yolostocks_rs::{OutputSink, Pipeline, Runner};
//!
//! let pipeline = Pipeline::builder().debug_dir(".").build()?;
//! let runner = Runner::new(pipeline, OutputSink::new("."));
//! let result = runner.run_single(false).await?;
//! println!("{} rows via {}", result.len(), result.provenance);
//! # Ok(())
//! # }
//! ```
//!
//! Fabricated sample rows are only ever produced in demo mode
//! ([`PipelineBuilder::demo_mode`]) and are tagged [`Provenance::Fallback`].

pub mod core;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod persist;
pub mod pipeline;

pub use crate::core::client::constants::PROBE_PATHS;
pub use crate::core::{
    ErrorKind, ExtractionResult, Field, MAX_RECORDS, Provenance, TickerRecord, YsClient,
    YsClientBuilder, YsError,
};
pub use extract::{ChainBuilder, ExtractorChain, Strategy};
pub use fetch::{BrowserFactory, BrowserKind, Page, Transport, TransportMode};
pub use normalize::normalize_rows;
pub use persist::{CsvMode, OutputSink};
pub use pipeline::{
    FailureTracker, Pipeline, PipelineBuilder, RunSummary, Runner, Schedule, StopReason,
};
