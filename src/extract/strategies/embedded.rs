use crate::core::{ExtractionResult, Provenance, YsError};
use crate::extract::Strategy;
use crate::extract::helpers::{find_ticker_list, records_from_items, truncate};
use crate::extract::utils::{find_matching_brace, iter_json_scripts};
use crate::fetch::Page;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

/// Global-state assignments that frameworks leave in server-rendered pages.
pub const STATE_MARKERS: [&str; 3] = [
    "window.__INITIAL_STATE__",
    "window.__PRELOADED_STATE__",
    "window.__NUXT__",
];

/// Parses framework state embedded in the markup and digs out the ticker list.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedState;

impl EmbeddedState {
    /// Synchronous core, usable on any markup.
    pub fn scan(html: &str) -> Result<Option<ExtractionResult>, YsError> {
        for marker in STATE_MARKERS {
            let Some(raw) = assigned_object(html, marker) else {
                continue;
            };
            debug!(marker, bytes = raw.len(), "found embedded state");
            let state: Value = serde_json::from_str(raw).map_err(|e| {
                debug!(marker, state = %truncate(raw, 200), "embedded state is not JSON");
                YsError::Json(e)
            })?;
            if let Some(result) = from_state(&state) {
                return Ok(Some(result));
            }
        }

        let next_data = iter_json_scripts(html).into_iter().find(|(tag, _)| {
            let tag = tag.to_ascii_lowercase();
            tag.contains("id=\"__next_data__\"") || tag.contains("id='__next_data__'")
        });
        if let Some((_, inner)) = next_data {
            debug!(bytes = inner.len(), "found __NEXT_DATA__ block");
            let state: Value = serde_json::from_str(inner.trim())?;
            return Ok(from_state(&state));
        }

        Ok(None)
    }
}

/// The `{...}` assigned right after `marker =`, if there is one.
fn assigned_object<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let at = html.find(marker)? + marker.len();
    let rest = html[at..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let start = html.len() - rest.len();
    let end = find_matching_brace(html, start)?;
    Some(&html[start..=end])
}

fn from_state(state: &Value) -> Option<ExtractionResult> {
    let items = find_ticker_list(state)?;
    ExtractionResult::new(Provenance::EmbeddedState, records_from_items(items)).non_empty()
}

impl Strategy for EmbeddedState {
    fn name(&self) -> &'static str {
        "embedded_state"
    }

    fn provenance(&self) -> Provenance {
        Provenance::EmbeddedState
    }

    fn attempt<'a>(
        &'a self,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Option<ExtractionResult>, YsError>> {
        Box::pin(async move { Self::scan(&page.html) })
    }
}
