//! Browser backend selection.
//!
//! Each [`BrowserKind`] is capability-checked by locating an executable (explicit
//! override, then `PATH`, then the usual install locations). [`BrowserFactory::launch`]
//! tries the available kinds in priority order and returns the first session that
//! comes up.

mod cdp;

pub use cdp::BrowserSession;

use crate::core::YsError;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default wait after navigation for client-side rendering.
pub const DEFAULT_RENDER_WAIT: Duration = Duration::from_secs(5);
/// How long a freshly spawned browser gets to announce its DevTools endpoint.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);
/// Per-command DevTools timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Chromium-family browsers that speak the DevTools protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chrome,
    Edge,
    Chromium,
}

impl BrowserKind {
    pub const ALL: [BrowserKind; 3] = [
        BrowserKind::Chrome,
        BrowserKind::Edge,
        BrowserKind::Chromium,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Edge => "edge",
            BrowserKind::Chromium => "chromium",
        }
    }

    /// Executable names looked up on `PATH`.
    fn binary_names(self) -> &'static [&'static str] {
        match self {
            BrowserKind::Chrome => &[
                "google-chrome",
                "google-chrome-stable",
                "chrome",
                "chrome.exe",
            ],
            BrowserKind::Edge => &[
                "microsoft-edge",
                "microsoft-edge-stable",
                "msedge",
                "msedge.exe",
            ],
            BrowserKind::Chromium => &["chromium", "chromium-browser", "chromium.exe"],
        }
    }

    /// Well-known absolute install locations.
    fn install_paths(self) -> &'static [&'static str] {
        match self {
            BrowserKind::Chrome => &[
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ],
            BrowserKind::Edge => &[
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
                r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
                r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
            ],
            BrowserKind::Chromium => &[
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
                "/snap/bin/chromium",
            ],
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = YsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "google-chrome" => Ok(BrowserKind::Chrome),
            "edge" | "msedge" => Ok(BrowserKind::Edge),
            "chromium" => Ok(BrowserKind::Chromium),
            other => Err(YsError::Data(format!("unknown browser: {other}"))),
        }
    }
}

/// Launch settings shared by every backend.
#[derive(Debug, Clone)]
pub(crate) struct LaunchOptions {
    pub render_wait: Duration,
    pub launch_timeout: Duration,
    pub command_timeout: Duration,
    pub user_agent: Option<String>,
}

/// Picks and launches a browser backend.
#[derive(Debug, Clone)]
pub struct BrowserFactory {
    priority: Vec<BrowserKind>,
    overrides: HashMap<BrowserKind, PathBuf>,
    opts: LaunchOptions,
}

impl Default for BrowserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserFactory {
    /// Chrome, then Edge, then Chromium.
    pub fn new() -> Self {
        Self {
            priority: BrowserKind::ALL.to_vec(),
            overrides: HashMap::new(),
            opts: LaunchOptions {
                render_wait: DEFAULT_RENDER_WAIT,
                launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
                command_timeout: DEFAULT_COMMAND_TIMEOUT,
                user_agent: None,
            },
        }
    }

    /// Replace the priority order. Duplicates are dropped.
    pub fn priority<I: IntoIterator<Item = BrowserKind>>(mut self, kinds: I) -> Self {
        let mut order = Vec::new();
        for k in kinds {
            if !order.contains(&k) {
                order.push(k);
            }
        }
        self.priority = order;
        self
    }

    /// Use this executable for `kind` instead of searching for one.
    pub fn executable(mut self, kind: BrowserKind, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(kind, path.into());
        self
    }

    pub fn render_wait(mut self, dur: Duration) -> Self {
        self.opts.render_wait = dur;
        self
    }

    pub fn launch_timeout(mut self, dur: Duration) -> Self {
        self.opts.launch_timeout = dur;
        self
    }

    pub fn command_timeout(mut self, dur: Duration) -> Self {
        self.opts.command_timeout = dur;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.opts.user_agent = Some(ua.into());
        self
    }

    pub fn priority_list(&self) -> &[BrowserKind] {
        &self.priority
    }

    /// Executable for `kind`, if one can be found.
    pub fn locate(&self, kind: BrowserKind) -> Option<PathBuf> {
        if let Some(p) = self.overrides.get(&kind) {
            return p.is_file().then(|| p.clone());
        }
        let on_path = std::env::var_os("PATH").and_then(|paths| {
            std::env::split_paths(&paths).find_map(|dir| {
                kind.binary_names()
                    .iter()
                    .map(|name| dir.join(name))
                    .find(|candidate| candidate.is_file())
            })
        });
        on_path.or_else(|| {
            kind.install_paths()
                .iter()
                .map(Path::new)
                .find(|p| p.is_file())
                .map(Path::to_path_buf)
        })
    }

    /// Backends that look launchable, in priority order.
    pub fn available(&self) -> Vec<(BrowserKind, PathBuf)> {
        self.priority
            .iter()
            .filter_map(|&k| self.locate(k).map(|p| (k, p)))
            .collect()
    }

    /// Start the first backend that comes up.
    pub async fn launch(&self) -> Result<BrowserSession, YsError> {
        let candidates = self.available();
        if candidates.is_empty() {
            let tried: Vec<&str> = self.priority.iter().map(|k| k.as_str()).collect();
            return Err(YsError::Driver(format!(
                "no compatible browser found (looked for: {})",
                tried.join(", ")
            )));
        }

        let mut failures = Vec::new();
        for (kind, exe) in candidates {
            debug!(browser = %kind, exe = %exe.display(), "launching browser");
            match cdp::launch(kind, &exe, &self.opts).await {
                Ok(session) => {
                    info!(browser = %kind, "browser session ready");
                    return Ok(session);
                }
                Err(e) => {
                    warn!(browser = %kind, error = %e, "browser launch failed, trying next");
                    failures.push(format!("{kind}: {e}"));
                }
            }
        }
        Err(YsError::Driver(failures.join("; ")))
    }
}
