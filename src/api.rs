//! Path-based dispatch of `/api/*` calls onto the hub.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{AGGREGATED_KEY, CUSTOM_KEY};
use crate::types::ResultEnvelope;
use crate::VodHub;

pub const SEARCH_ROUTE: &str = "/api/search";
pub const DETAIL_ROUTE: &str = "/api/detail";

/// Explicit router handed to whatever serves HTTP (see [`crate::server`]) or to the CLI.
#[derive(Clone)]
pub struct ApiRouter {
    hub: Arc<VodHub>,
}

impl ApiRouter {
    pub fn new(hub: Arc<VodHub>) -> Self { Self { hub } }

    pub fn hub(&self) -> &VodHub { &self.hub }

    /// Handle one call. Errors become a `code: 400` envelope; this never fails.
    pub async fn dispatch(&self, path: &str, params: &HashMap<String, String>) -> ResultEnvelope {
        match self.route(path, params).await {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(path, error = %e, "api call rejected");
                ResultEnvelope::failure(&e)
            }
        }
    }

    async fn route(&self, path: &str, params: &HashMap<String, String>) -> Result<ResultEnvelope> {
        let param = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());
        let source = param("source").unwrap_or(&self.hub.settings().default_source);
        let custom_api = param("customApi");

        match path {
            SEARCH_ROUTE => {
                let query = param("wd")
                    .filter(|q| !q.trim().is_empty())
                    .ok_or_else(|| Error::invalid("missing search query"))?;
                let list = match (source, custom_api) {
                    (AGGREGATED_KEY, _) => self.hub.search_aggregated(query).await,
                    (CUSTOM_KEY, Some(apis)) if apis.contains(',') => self.hub.search_custom_many(query, apis).await,
                    _ => self.hub.search(query, source, custom_api).await?,
                };
                Ok(ResultEnvelope::search(list))
            }
            DETAIL_ROUTE => {
                let id = param("id").ok_or_else(|| Error::invalid("missing video id"))?;
                let scrape = param("useDetail") == Some("true");
                let detail = self.hub.detail(id, source, custom_api, scrape).await?;
                Ok(ResultEnvelope::detail(detail))
            }
            _ => Err(Error::RouteNotFound("unknown API route".to_string())),
        }
    }
}
