use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fetch::FetchRequest;
use crate::registry::CUSTOM_KEY;
use crate::types::SearchResultItem;
use crate::{Target, VodHub};

impl VodHub {
    /// Single-provider search: one bounded upstream call, items stamped with their origin.
    pub async fn search(&self, query: &str, source: &str, custom_api: Option<&str>) -> Result<Vec<SearchResultItem>> {
        if query.trim().is_empty() { return Err(Error::invalid("missing search query")); }
        let target = self.resolve_target(source, custom_api)?;

        let url = self.search_url(target.api_base(), query);
        let body = self.fetch_json(url, Some(self.settings().timeouts.request())).await?;
        let list = take_list(body).ok_or_else(|| Error::upstream("upstream payload has no list"))?;
        let items = stamp_all(list, &target);
        debug!(source = target.source_code(), count = items.len(), "search complete");
        Ok(items)
    }

    /// Availability probe for a candidate custom endpoint.
    pub async fn check_site(&self, api_url: &str) -> bool {
        let limit = self.settings().timeouts.check();
        match tokio::time::timeout(limit, self.search("test", CUSTOM_KEY, Some(api_url))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => { debug!(api_url, error = %e, "site check failed"); false }
            Err(_) => { debug!(api_url, ?limit, "site check timed out"); false }
        }
    }

    pub(crate) fn search_url(&self, base: &str, query: &str) -> String {
        format!("{}{}{}", base, self.settings().endpoints.search_path, urlencoding::encode(query))
    }

    /// GET `target` with the configured headers and decode a JSON body.
    /// Non-2xx statuses and undecodable bodies are upstream errors.
    pub(crate) async fn fetch_json(&self, target: String, timeout: Option<Duration>) -> Result<Value> {
        let request = FetchRequest::new(target).headers(self.settings().header_pairs()).timeout(timeout);
        let resp = self.fetcher().fetch(request).await?;
        if !resp.is_success() {
            return Err(Error::upstream(format!("upstream request failed: {}", resp.status)));
        }
        Ok(resp.json()?)
    }
}

/// The `list` array of an upstream payload, if it has one.
pub(crate) fn take_list(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Object(mut map) => match map.remove("list") {
            Some(Value::Array(list)) => Some(list),
            _ => None,
        },
        _ => None,
    }
}

fn stamp_all(list: Vec<Value>, target: &Target<'_>) -> Vec<SearchResultItem> {
    list.into_iter()
        .filter_map(|raw| SearchResultItem::stamp(raw, target.source_name(), target.source_code(), target.api_url()))
        .collect()
}
