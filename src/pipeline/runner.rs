use super::schedule::{Iteration, RunSummary, Schedule, drive};
use super::Pipeline;
use crate::core::{ExtractionResult, YsError};
use crate::fetch::Transport;
use crate::persist::{CsvMode, OutputSink};
use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::{info, warn};

/// Ties a [`Pipeline`] to an [`OutputSink`].
pub struct Runner {
    pipeline: Pipeline,
    sink: OutputSink,
}

impl Runner {
    pub fn new(pipeline: Pipeline, sink: OutputSink) -> Self {
        Self { pipeline, sink }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    /// Scrape once and write the result. Nothing is written when nothing was found.
    pub async fn run_single(&self, append: bool) -> Result<ExtractionResult, YsError> {
        let result = self.pipeline.scrape().await?;
        self.write_single(&result, append)?;
        Ok(result)
    }

    /// [`Runner::run_single`] that stops early once `shutdown` flips.
    /// `Ok(None)` means interrupted before anything was written.
    pub async fn run_single_until(
        &self,
        append: bool,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<ExtractionResult>, YsError> {
        let Some(result) = self.pipeline.scrape_until(shutdown).await? else {
            return Ok(None);
        };
        self.write_single(&result, append)?;
        Ok(Some(result))
    }

    fn write_single(&self, result: &ExtractionResult, append: bool) -> Result<usize, YsError> {
        let mode = if append { CsvMode::Append } else { CsvMode::Overwrite };
        self.sink.write(result, mode)
    }

    /// Scrape on `schedule` until it says stop, appending every real result.
    ///
    /// The transport (and browser process, if any) is opened once and closed on
    /// every exit path.
    pub async fn run_continuous(
        &self,
        schedule: &Schedule,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<RunSummary, YsError> {
        let mut transport = self.pipeline.open_transport().await?;
        let sink = self.sink.clone().timestamped(true);
        let summary = {
            let mut step = ContinuousStep {
                pipeline: &self.pipeline,
                transport: &mut transport,
                sink: &sink,
            };
            drive(schedule, shutdown, &mut step).await
        };
        transport.close().await;
        Ok(summary)
    }
}

struct ContinuousStep<'a> {
    pipeline: &'a Pipeline,
    transport: &'a mut Transport,
    sink: &'a OutputSink,
}

impl Iteration for ContinuousStep<'_> {
    fn run(&mut self, n: u32) -> BoxFuture<'_, Result<usize, YsError>> {
        Box::pin(async move {
            info!(iteration = n, "scrape starting");
            let result = self.pipeline.run_once(self.transport).await?;
            if result.is_fabricated() {
                warn!(iteration = n, "demo rows are not recorded in continuous mode");
                return Err(YsError::ExtractionEmpty);
            }
            self.sink.write(&result, CsvMode::Append)
        })
    }
}
