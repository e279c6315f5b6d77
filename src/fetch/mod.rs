//! Page transports: a plain HTTP GET, or a headless browser driven over the
//! DevTools protocol. Both produce a [`Page`].

pub mod browser;
mod http;

pub use browser::{BrowserFactory, BrowserKind, BrowserSession};
pub use http::HttpTransport;

use crate::core::{YsClient, YsError};
use crate::extract::utils::visible_text;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// How pages are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Plain HTTP GET of the server-rendered markup.
    #[default]
    Http,
    /// Rendered DOM from a headless Chromium-family browser.
    Browser,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Http => "http",
            TransportMode::Browser => "browser",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = YsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "request" | "plain" => Ok(TransportMode::Http),
            "browser" | "cdp" | "headless" => Ok(TransportMode::Browser),
            other => Err(YsError::Data(format!("unknown transport mode: {other}"))),
        }
    }
}

/// Raw content of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    /// Markup as served (HTTP) or as rendered (browser).
    pub html: String,
    /// Visible text, one line per block element.
    pub text: String,
    pub transport: TransportMode,
}

impl Page {
    /// Page from markup; visible text is derived from the tags.
    pub fn from_markup(
        url: impl Into<String>,
        html: impl Into<String>,
        transport: TransportMode,
    ) -> Self {
        let html = html.into();
        let text = visible_text(&html);
        Self {
            url: url.into(),
            html,
            text,
            transport,
        }
    }

    /// Page where the renderer already supplied the visible text.
    pub fn rendered(url: impl Into<String>, html: String, text: String) -> Self {
        Self {
            url: url.into(),
            html,
            text,
            transport: TransportMode::Browser,
        }
    }

    /// Stand-in used when the fetch itself failed; content-free strategies can still run.
    pub fn empty(url: impl Into<String>, transport: TransportMode) -> Self {
        Self {
            url: url.into(),
            html: String::new(),
            text: String::new(),
            transport,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty() && self.text.trim().is_empty()
    }
}

/// An open transport. The browser variant owns a child process; call
/// [`Transport::close`] on every exit path.
pub enum Transport {
    Http(HttpTransport),
    Browser(BrowserSession),
}

impl Transport {
    /// Open a transport of the requested mode. Browser mode walks the factory's
    /// priority list and fails with [`YsError::Driver`] if nothing starts.
    pub async fn open(
        mode: TransportMode,
        client: &YsClient,
        browsers: &BrowserFactory,
    ) -> Result<Self, YsError> {
        match mode {
            TransportMode::Http => Ok(Transport::Http(HttpTransport::new(client.clone()))),
            TransportMode::Browser => Ok(Transport::Browser(browsers.launch().await?)),
        }
    }

    pub fn mode(&self) -> TransportMode {
        match self {
            Transport::Http(_) => TransportMode::Http,
            Transport::Browser(_) => TransportMode::Browser,
        }
    }

    pub async fn fetch(&mut self, url: &Url) -> Result<Page, YsError> {
        match self {
            Transport::Http(t) => t.fetch(url).await,
            Transport::Browser(s) => s.fetch(url).await,
        }
    }

    /// Release the transport. For the browser this terminates the process.
    pub async fn close(self) {
        if let Transport::Browser(session) = self {
            session.close().await;
        }
    }
}
