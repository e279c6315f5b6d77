use super::{Page, TransportMode};
use crate::core::client::constants::PAGE_ACCEPT;
use crate::core::{YsClient, YsError, net};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use tracing::debug;
use url::Url;

/// Plain GET through the shared `reqwest` client. Holds no connection between calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: YsClient,
}

impl HttpTransport {
    pub fn new(client: YsClient) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &Url) -> Result<Page, YsError> {
        debug!(%url, "GET page");
        let resp = self
            .client
            .http()
            .get(url.clone())
            .header(ACCEPT, PAGE_ACCEPT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    YsError::Timeout(format!("GET {url}"))
                } else {
                    YsError::Http(e)
                }
            })?;

        if !resp.status().is_success() {
            return Err(YsError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        let fetched = net::read_response(resp).await?;
        debug!(status = fetched.status, bytes = fetched.body.len(), "page fetched");
        Ok(Page::from_markup(url.as_str(), fetched.body, TransportMode::Http))
    }
}
