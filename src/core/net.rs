use crate::core::YsError;
use reqwest::header::CONTENT_TYPE;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub(crate) struct Fetched {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Read the response body as text, keeping the status and content type around.
pub(crate) async fn read_response(resp: reqwest::Response) -> Result<Fetched, YsError> {
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.text().await?;
    Ok(Fetched {
        status,
        content_type,
        body,
    })
}

/// True when a body is markup rather than data: either the server says so,
/// or the payload opens with a doctype / `<html` tag.
pub fn looks_like_html(content_type: Option<&str>, body: &str) -> bool {
    if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("html")) {
        return true;
    }
    let head: String = body
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}
