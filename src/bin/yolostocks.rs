//! `yolostocks`: scrape the top-15 board once, or keep scraping on an interval.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;
use yolostocks_rs::persist::{DEFAULT_CSV_NAME, DEFAULT_JSON_NAME};
use yolostocks_rs::{
    BrowserFactory, BrowserKind, ExtractionResult, OutputSink, Pipeline, Runner, Schedule,
    TransportMode, YsClient, YsError,
};

/// Scrape the Top 15 r/WallStreetBets tickers from yolostocks.live.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Keep scraping every --interval minutes
    #[arg(long, conflicts_with = "single")]
    continuous: bool,

    /// Scrape once (the default)
    #[arg(long)]
    single: bool,

    /// Minutes between scrapes in continuous mode
    #[arg(long, default_value_t = 5.0, value_name = "MIN")]
    interval: f64,

    /// Total hours to run in continuous mode (unbounded if omitted)
    #[arg(long, value_name = "HOURS")]
    duration: Option<f64>,

    /// Consecutive failed iterations that end continuous mode
    #[arg(long, default_value_t = 3)]
    max_failures: u32,

    /// How to fetch the page: http or browser
    #[arg(long, default_value = "http")]
    transport: TransportMode,

    /// Browser priority for --transport browser (repeatable)
    #[arg(long = "browser", value_name = "KIND")]
    browsers: Vec<BrowserKind>,

    /// Page to scrape
    #[arg(long, default_value = "https://yolostocks.live/")]
    url: Url,

    /// Directory for the output files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_CSV_NAME)]
    csv: String,

    #[arg(long, default_value = DEFAULT_JSON_NAME)]
    json: String,

    /// Append to the CSV instead of replacing it (always on in continuous mode)
    #[arg(long)]
    append: bool,

    /// Emit clearly labeled fabricated rows when nothing real is found
    #[arg(long)]
    demo: bool,

    /// Do not guess JSON endpoints
    #[arg(long)]
    skip_probe: bool,

    /// Seconds to let the browser render before reading the DOM
    #[arg(long, default_value_t = 5.0, value_name = "SECS")]
    render_wait: f64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30.0, value_name = "SECS")]
    timeout: f64,

    /// Debug logging (RUST_LOG wins when set)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn secs(value: f64, what: &str) -> Result<Duration> {
    if !value.is_finite() || value < 0.0 {
        bail!("{what} must be a non-negative number, got {value}");
    }
    Ok(Duration::from_secs_f64(value))
}

fn print_table(result: &ExtractionResult) {
    let label = if result.is_fabricated() {
        " (DEMO DATA, NOT REAL)"
    } else {
        ""
    };
    println!(
        "Top {} tickers via {}{label} at {}",
        result.len(),
        result.provenance,
        result.scraped_at.to_rfc3339()
    );
    for rec in &result.records {
        let cells: Vec<String> = rec.iter().map(|(k, v)| format!("{k}={v}")).collect();
        println!("  {}", cells.join("  "));
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let client = YsClient::builder()
        .base_url(args.url.clone())
        .timeout(secs(args.timeout, "--timeout")?)
        .build()
        .context("building HTTP client")?;

    let mut browsers = BrowserFactory::new().render_wait(secs(args.render_wait, "--render-wait")?);
    if !args.browsers.is_empty() {
        browsers = browsers.priority(args.browsers.iter().copied());
    }

    let pipeline = Pipeline::builder()
        .client(client)
        .target(args.url.clone())
        .transport(args.transport)
        .browsers(browsers)
        .skip_probe(args.skip_probe)
        .demo_mode(args.demo)
        .debug_dir(&args.out_dir)
        .build()?;
    let sink = OutputSink::new(&args.out_dir)
        .csv_name(&args.csv)
        .json_name(&args.json);
    let runner = Runner::new(pipeline, sink);

    let (stop_tx, mut stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after cleanup");
            let _ = stop_tx.send(true);
        }
    });

    if !args.continuous {
        return match runner.run_single_until(args.append, &mut stop_rx).await {
            Ok(Some(result)) => {
                print_table(&result);
                Ok(ExitCode::SUCCESS)
            }
            Ok(None) => {
                warn!("interrupted before any data was saved");
                Ok(ExitCode::from(1))
            }
            Err(e @ YsError::Io(_)) => Err(e).context("writing output files"),
            Err(e) => {
                error!(error = %e, kind = ?e.kind(), "scrape found no data");
                Ok(ExitCode::from(1))
            }
        };
    }

    let schedule = Schedule::default()
        .interval(secs(args.interval * 60.0, "--interval")?)
        .duration(args.duration.map(|h| secs(h * 3600.0, "--duration")).transpose()?)
        .max_failures(args.max_failures);

    let summary = runner.run_continuous(&schedule, &mut stop_rx).await?;
    info!(
        iterations = summary.iterations,
        successes = summary.successes,
        failures = summary.failures,
        elapsed_secs = summary.elapsed.as_secs(),
        reason = %summary.reason,
        "done"
    );
    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
