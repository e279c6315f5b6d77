use super::{BrowserKind, LaunchOptions};
use crate::core::YsError;
use crate::core::client::constants::USER_AGENT;
use crate::fetch::Page;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};
use url::Url;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const DEVTOOLS_BANNER: &str = "DevTools listening on ";
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/* ---------------- wire ---------------- */

#[derive(Deserialize)]
struct Reply {
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ReplyError>,
}

#[derive(Deserialize)]
struct ReplyError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedTarget {
    target_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachedTarget {
    session_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Navigated {
    #[serde(default)]
    error_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Evaluated {
    result: RemoteObject,
    #[serde(default)]
    exception_details: Option<Value>,
}

#[derive(Deserialize)]
struct RemoteObject {
    #[serde(default)]
    value: Option<Value>,
}

/* ---------------- session ---------------- */

/// A running headless browser plus one attached page target.
///
/// Owns the child process and its throwaway profile directory; both are released by
/// [`BrowserSession::close`]. Dropping without closing still kills the process.
pub struct BrowserSession {
    kind: BrowserKind,
    child: Child,
    socket: Socket,
    page_session: String,
    next_id: u64,
    profile_dir: PathBuf,
    render_wait: Duration,
    command_timeout: Duration,
}

/// Removes the scratch profile unless disarmed. Covers failed launches and launches
/// dropped mid-flight by a cancelled caller.
struct ProfileGuard(Option<PathBuf>);

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        if let Some(dir) = self.0.take() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

pub(super) async fn launch(
    kind: BrowserKind,
    exe: &Path,
    opts: &LaunchOptions,
) -> Result<BrowserSession, YsError> {
    let profile_dir = scratch_profile_dir(kind)?;
    let mut guard = ProfileGuard(Some(profile_dir.clone()));
    let session = start(kind, exe, opts, &profile_dir).await?;
    guard.0 = None;
    Ok(session)
}

async fn start(
    kind: BrowserKind,
    exe: &Path,
    opts: &LaunchOptions,
    profile_dir: &Path,
) -> Result<BrowserSession, YsError> {
    let ua = opts.user_agent.as_deref().unwrap_or(USER_AGENT);
    let mut child = Command::new(exe)
        .arg("--headless=new")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--window-size=1920,1080")
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--remote-debugging-port=0")
        .arg(format!("--user-agent={ua}"))
        .arg(format!("--user-data-dir={}", profile_dir.display()))
        .arg("about:blank")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| YsError::Driver(format!("{kind}: spawn {}: {e}", exe.display())))?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| YsError::Driver(format!("{kind}: stderr not captured")))?;
    let mut lines = BufReader::new(stderr).lines();

    let ws_url = timeout(opts.launch_timeout, devtools_endpoint(kind, &mut lines))
        .await
        .map_err(|_| YsError::Timeout(format!("{kind}: DevTools endpoint not announced")))??;

    // stderr stays drained for the life of the process
    tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

    debug!(browser = %kind, %ws_url, "connecting to DevTools");
    let (socket, _) = timeout(opts.launch_timeout, connect_async(ws_url.as_str()))
        .await
        .map_err(|_| YsError::Timeout(format!("{kind}: DevTools connect")))??;

    let mut session = BrowserSession {
        kind,
        child,
        socket,
        page_session: String::new(),
        next_id: 0,
        profile_dir: profile_dir.to_path_buf(),
        render_wait: opts.render_wait,
        command_timeout: opts.command_timeout,
    };

    let created: CreatedTarget = session
        .call("Target.createTarget", json!({ "url": "about:blank" }), false)
        .await?;
    let attached: AttachedTarget = session
        .call(
            "Target.attachToTarget",
            json!({ "targetId": created.target_id, "flatten": true }),
            false,
        )
        .await?;
    session.page_session = attached.session_id;
    Ok(session)
}

async fn devtools_endpoint<R>(
    kind: BrowserKind,
    lines: &mut tokio::io::Lines<R>,
) -> Result<String, YsError>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        trace!(browser = %kind, "{line}");
        if let Some((_, rest)) = line.split_once(DEVTOOLS_BANNER) {
            return Ok(rest.trim().to_string());
        }
    }
    Err(YsError::Driver(format!("{kind}: exited before opening DevTools")))
}

fn scratch_profile_dir(kind: BrowserKind) -> Result<PathBuf, YsError> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!(
        "yolostocks-{}-{}-{nanos}",
        kind.as_str(),
        std::process::id()
    ));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl BrowserSession {
    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    /// Navigate, wait for client-side rendering, then read back the DOM.
    pub async fn fetch(&mut self, url: &Url) -> Result<Page, YsError> {
        debug!(browser = %self.kind, %url, "navigate");
        let nav: Navigated = self
            .call("Page.navigate", json!({ "url": url.as_str() }), true)
            .await?;
        if let Some(err) = nav.error_text.filter(|e| !e.is_empty()) {
            return Err(YsError::Navigation(format!("{url}: {err}")));
        }

        tokio::time::sleep(self.render_wait).await;

        let html = self.evaluate_string("document.documentElement.outerHTML").await?;
        let text = self
            .evaluate_string("document.body ? document.body.innerText : ''")
            .await?;
        debug!(bytes = html.len(), "rendered page captured");
        Ok(Page::rendered(url.as_str(), html, text))
    }

    /// Shut the browser down and delete its profile. Never fails; problems are logged.
    pub async fn close(mut self) {
        let bye = self.call::<Value>("Browser.close", json!({}), false);
        if timeout(CLOSE_GRACE, bye).await.is_err() {
            debug!(browser = %self.kind, "Browser.close did not answer");
        }
        let _ = self.socket.close(None).await;
        if let Err(e) = self.child.kill().await {
            debug!(browser = %self.kind, error = %e, "kill after close");
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.profile_dir).await {
            warn!(
                dir = %self.profile_dir.display(),
                error = %e,
                "could not remove browser profile"
            );
        }
        info!(browser = %self.kind, "browser session closed");
    }

    async fn evaluate_string(&mut self, expression: &str) -> Result<String, YsError> {
        let eval: Evaluated = self
            .call(
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true }),
                true,
            )
            .await?;
        if let Some(ex) = eval.exception_details {
            return Err(YsError::Driver(format!("script threw: {ex}")));
        }
        match eval.result.value {
            Some(Value::String(s)) => Ok(s),
            Some(Value::Null) | None => Ok(String::new()),
            Some(other) => Ok(other.to_string()),
        }
    }

    /// One DevTools round trip. Events arriving in between are skipped.
    async fn call<T: for<'de> Deserialize<'de>>(
        &mut self,
        method: &str,
        params: Value,
        scoped: bool,
    ) -> Result<T, YsError> {
        self.next_id += 1;
        let id = self.next_id;
        let mut msg = json!({ "id": id, "method": method, "params": params });
        if scoped {
            msg["sessionId"] = Value::String(self.page_session.clone());
        }

        let result = timeout(
            self.command_timeout,
            round_trip(&mut self.socket, id, method, msg),
        )
        .await
        .map_err(|_| YsError::Timeout(format!("DevTools {method}")))??;

        Ok(serde_json::from_value(result)?)
    }
}

async fn round_trip(
    socket: &mut Socket,
    id: u64,
    method: &str,
    msg: Value,
) -> Result<Value, YsError> {
    socket.send(Message::Text(msg.to_string().into())).await?;
    while let Some(frame) = socket.next().await {
        let text = match frame? {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };
        let reply: Reply = serde_json::from_str(text.as_str())?;
        if reply.id != Some(id) {
            continue;
        }
        if let Some(err) = reply.error {
            return Err(YsError::Driver(format!(
                "{method} failed ({}): {}",
                err.code, err.message
            )));
        }
        return Ok(reply.result.unwrap_or(Value::Null));
    }
    Err(YsError::Driver(format!("connection closed during {method}")))
}
