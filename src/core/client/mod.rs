//! Public client surface + builder.
//! Defaults (UA, base URL, probe list and timings) live in `constants`.

pub(crate) mod constants;

use crate::core::YsError;
use constants::{
    DEFAULT_BASE_URL, DEFAULT_PROBE_DELAY, DEFAULT_PROBE_TIMEOUT, DEFAULT_TIMEOUT, PROBE_PATHS,
    USER_AGENT,
};
use reqwest::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

/// Cookie jar shared by every clone of one client, emptied between scrape iterations.
#[derive(Debug, Default)]
struct SessionCookies {
    jar: RwLock<Jar>,
}

impl SessionCookies {
    fn reset(&self) {
        let mut jar = self.jar.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *jar = Jar::default();
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let jar = self.jar.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        jar.set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let jar = self.jar.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        jar.cookies(url)
    }
}

/// HTTP client bound to one target site.
///
/// Cheap to clone; the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct YsClient {
    http: Client,
    cookies: Arc<SessionCookies>,
    base_url: Url,
    probe_paths: Vec<String>,
    probe_timeout: Duration,
    probe_delay: Duration,
}

impl YsClient {
    /// Create a new builder.
    pub fn builder() -> YsClientBuilder {
        YsClientBuilder::default()
    }

    /// Build a client with every default applied.
    pub fn new() -> Result<Self, YsError> {
        Self::builder().build()
    }

    /// Forget every cookie the site has set. The page fetch and the endpoint
    /// probes of one iteration share a jar; the next iteration starts empty.
    pub fn reset_session(&self) {
        self.cookies.reset();
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// The page the pipeline scrapes.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn probe_paths(&self) -> &[String] {
        &self.probe_paths
    }

    pub(crate) fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub(crate) fn probe_delay(&self) -> Duration {
        self.probe_delay
    }

    /// Resolve a probe suffix (e.g. `/api/tickers`) against the site origin.
    pub(crate) fn probe_url(&self, path: &str) -> Result<Url, YsError> {
        Ok(self.base_url.join(path)?)
    }

    /// `scheme://host[:port]` of the target, used for `Origin` and `Referer`.
    pub(crate) fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct YsClientBuilder {
    user_agent: Option<String>,
    base_url: Option<Url>,
    probe_paths: Option<Vec<String>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    probe_timeout: Option<Duration>,
    probe_delay: Option<Duration>,
}

impl YsClientBuilder {
    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the target page (e.g., a mock server in tests).
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Replace the list of guessed JSON endpoints.
    pub fn probe_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.probe_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Set the overall page request timeout. Default: 30s.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Timeout for each endpoint probe. Default: 5s.
    pub fn probe_timeout(mut self, dur: Duration) -> Self {
        self.probe_timeout = Some(dur);
        self
    }

    /// Delay before each endpoint probe. Default: 500ms. Tests set this to zero.
    pub fn probe_delay(mut self, dur: Duration) -> Self {
        self.probe_delay = Some(dur);
        self
    }

    pub fn build(self) -> Result<YsClient, YsError> {
        let base_url = match self.base_url {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let cookies = Arc::new(SessionCookies::default());
        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .cookie_provider(Arc::clone(&cookies))
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT));

        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        let http = httpb.build()?;

        Ok(YsClient {
            http,
            cookies,
            base_url,
            probe_paths: self
                .probe_paths
                .unwrap_or_else(|| PROBE_PATHS.iter().map(|p| (*p).to_string()).collect()),
            probe_timeout: self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT),
            probe_delay: self.probe_delay.unwrap_or(DEFAULT_PROBE_DELAY),
        })
    }
}
