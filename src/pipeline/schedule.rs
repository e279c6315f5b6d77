//! Continuous-mode driver: run a step on a fixed interval until the duration runs
//! out, too many steps fail in a row, or shutdown is requested.

use crate::core::YsError;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_MAX_FAILURES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    /// `None` runs until stopped.
    pub duration: Option<Duration>,
    pub max_failures: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            duration: None,
            max_failures: DEFAULT_MAX_FAILURES,
        }
    }
}

impl Schedule {
    pub fn interval(mut self, dur: Duration) -> Self {
        self.interval = dur;
        self
    }

    pub fn duration(mut self, dur: Option<Duration>) -> Self {
        self.duration = dur;
        self
    }

    /// Clamped to at least 1.
    pub fn max_failures(mut self, n: u32) -> Self {
        self.max_failures = n.max(1);
        self
    }
}

/// Consecutive-failure counter. A success resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureTracker {
    consecutive: u32,
    threshold: u32,
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Returns true once the threshold is reached.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive += 1;
        self.tripped()
    }

    pub fn tripped(&self) -> bool {
        self.consecutive >= self.threshold
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    DurationElapsed,
    TooManyFailures,
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::DurationElapsed => "duration elapsed",
            StopReason::TooManyFailures => "too many consecutive failures",
            StopReason::Interrupted => "interrupted",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub iterations: u32,
    pub successes: u32,
    pub failures: u32,
    pub elapsed: Duration,
    pub reason: StopReason,
}

impl RunSummary {
    /// Failure-threshold stops are the only unsuccessful outcome.
    pub fn is_success(&self) -> bool {
        self.reason != StopReason::TooManyFailures
    }
}

/// One continuous-mode iteration. `Ok(n)` with `n > 0` counts as a success.
pub trait Iteration: Send {
    fn run(&mut self, n: u32) -> BoxFuture<'_, Result<usize, YsError>>;
}

/// Resolves once shutdown is flagged. Never resolves if the sender is gone.
pub(crate) async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

pub async fn drive(
    schedule: &Schedule,
    shutdown: &mut watch::Receiver<bool>,
    step: &mut dyn Iteration,
) -> RunSummary {
    let started_at = Utc::now();
    let start = Instant::now();
    let deadline = schedule.duration.map(|d| start + d);
    let mut tracker = FailureTracker::new(schedule.max_failures);
    let (mut iterations, mut successes, mut failures) = (0u32, 0u32, 0u32);

    info!(
        interval_secs = schedule.interval.as_secs_f64(),
        duration_secs = schedule.duration.map(|d| d.as_secs_f64()),
        max_failures = schedule.max_failures,
        "continuous mode started"
    );

    let reason = 'run: loop {
        if *shutdown.borrow() {
            break StopReason::Interrupted;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break StopReason::DurationElapsed;
        }

        iterations += 1;
        let outcome = tokio::select! {
            r = step.run(iterations) => r,
            _ = shutdown_requested(shutdown) => break 'run StopReason::Interrupted,
        };

        match outcome {
            Ok(rows) if rows > 0 => {
                successes += 1;
                tracker.record_success();
                info!(iteration = iterations, rows, "iteration succeeded");
            }
            other => {
                failures += 1;
                let err = match other {
                    Err(e) => e,
                    Ok(_) => YsError::ExtractionEmpty,
                };
                let tripped = tracker.record_failure();
                warn!(
                    iteration = iterations,
                    consecutive = tracker.consecutive(),
                    error = %err,
                    "iteration failed"
                );
                if tripped {
                    break StopReason::TooManyFailures;
                }
            }
        }

        let nap = match deadline {
            Some(d) => {
                let left = d.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    break StopReason::DurationElapsed;
                }
                schedule.interval.min(left)
            }
            None => schedule.interval,
        };
        tokio::select! {
            _ = tokio::time::sleep(nap) => {}
            _ = shutdown_requested(shutdown) => break 'run StopReason::Interrupted,
        }
    };

    let summary = RunSummary {
        started_at,
        iterations,
        successes,
        failures,
        elapsed: start.elapsed(),
        reason,
    };
    info!(
        iterations,
        successes,
        failures,
        reason = %summary.reason,
        "continuous mode stopped"
    );
    summary
}
