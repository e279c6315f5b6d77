//! Centralized constants for default endpoints, UA and timings.

use std::time::Duration;

/// Default desktop UA to avoid trivial bot blocking.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

/// The board we scrape.
pub(crate) const DEFAULT_BASE_URL: &str = "https://yolostocks.live/";

/// Overall request timeout for page fetches.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request timeout for endpoint probes.
pub(crate) const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause before each endpoint probe so the host is not hammered.
pub(crate) const DEFAULT_PROBE_DELAY: Duration = Duration::from_millis(500);

/// Accept header used when probing for JSON endpoints.
pub(crate) const PROBE_ACCEPT: &str = "application/json, text/plain, */*";

/// Accept header used for the HTML page itself.
pub(crate) const PAGE_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Guessed JSON endpoints, tried in this order.
pub const PROBE_PATHS: &[&str] = &[
    "/api/tickers",
    "/api/wsb/tickers",
    "/api/top-tickers",
    "/api/trending",
    "/api/data",
    "/api/stocks",
    "/api/meme-stocks",
    "/data/tickers.json",
    "/data/wsb.json",
    "/tickers.json",
    "/wsb.json",
    "/api/v1/tickers",
    "/api/v1/wsb",
    "/api/reddit/wallstreetbets",
    "/api/top15",
    "/data",
    "/tickers",
    "/wsb/top",
    "/reddit/wsb",
];
