use crate::core::client::constants::PROBE_ACCEPT;
use crate::core::net::{self, looks_like_html};
use crate::core::{ExtractionResult, Provenance, YsClient, YsError};
use crate::extract::Strategy;
use crate::extract::helpers::{records_from_json, truncate};
use crate::fetch::Page;
use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, ORIGIN, REFERER};
use tracing::{debug, info};
use url::Url;

/// Guesses JSON endpoints next to the page and takes the first one that answers
/// with usable data. Does not look at the page content at all.
#[derive(Debug, Clone)]
pub struct EndpointProbe {
    client: YsClient,
}

impl EndpointProbe {
    pub fn new(client: YsClient) -> Self {
        Self { client }
    }

    async fn probe_all(&self) -> Result<Option<ExtractionResult>, YsError> {
        for path in self.client.probe_paths() {
            let url = self.client.probe_url(path)?;
            tokio::time::sleep(self.client.probe_delay()).await;

            match self.probe(&url).await {
                Ok(Some(result)) => {
                    info!(%url, rows = result.len(), "endpoint answered with data");
                    return Ok(Some(result));
                }
                Ok(None) => {}
                Err(e) => debug!(%url, error = %e, "probe failed"),
            }
        }
        Ok(None)
    }

    async fn probe(&self, url: &Url) -> Result<Option<ExtractionResult>, YsError> {
        let origin = self.client.origin();
        let resp = self
            .client
            .http()
            .get(url.clone())
            .header(ACCEPT, PROBE_ACCEPT)
            .header(REFERER, self.client.base_url().as_str())
            .header(ORIGIN, origin)
            .timeout(self.client.probe_timeout())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    YsError::Timeout(format!("probe {url}"))
                } else {
                    YsError::Http(e)
                }
            })?;

        if resp.status().as_u16() != 200 {
            debug!(%url, status = resp.status().as_u16(), "probe miss");
            return Ok(None);
        }

        let fetched = net::read_response(resp).await?;
        if looks_like_html(fetched.content_type.as_deref(), &fetched.body) {
            debug!(%url, "probe returned markup, skipping");
            return Ok(None);
        }

        let value: serde_json::Value = serde_json::from_str(&fetched.body).map_err(|e| {
            debug!(%url, body = %truncate(&fetched.body, 200), "probe body is not JSON");
            YsError::Json(e)
        })?;

        Ok(ExtractionResult::new(Provenance::EndpointProbe, records_from_json(&value))
            .with_source(url.as_str())
            .non_empty())
    }
}

impl Strategy for EndpointProbe {
    fn name(&self) -> &'static str {
        "endpoint_probe"
    }

    fn provenance(&self) -> Provenance {
        Provenance::EndpointProbe
    }

    fn attempt<'a>(
        &'a self,
        _page: &'a Page,
    ) -> BoxFuture<'a, Result<Option<ExtractionResult>, YsError>> {
        Box::pin(self.probe_all())
    }
}
