//! Stream-link extraction for providers without a structured detail API.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::fetch::FetchRequest;
use crate::registry::{ProviderDescriptor, CUSTOM_KEY, CUSTOM_SOURCE_NAME};
use crate::types::VideoDetail;
use crate::VodHub;

const SPECIAL_TITLE: &str = "Video detail";
const CUSTOM_TITLE: &str = "Custom video";

/// `$` + http(s) URL up to the first `.m3u8`, stopping at quotes and whitespace.
static MANIFEST_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\$(https?://[^"'\s]+?\.m3u8)"#).expect("valid manifest link regex"));

/// Pull manifest links out of raw HTML, stripping the leading `$` and any `(...)` suffix.
/// With `dedupe`, repeated matches are kept once, at their first position.
pub fn extract_manifest_links(html: &str, dedupe: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    MANIFEST_LINK
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|link| !dedupe || seen.insert(*link))
        .map(|link| link.split('(').next().unwrap_or(link).to_string())
        .collect()
}

impl VodHub {
    pub(crate) async fn scrape_special(&self, id: &str, provider: &ProviderDescriptor) -> Result<VideoDetail> {
        let base = provider.detail.as_deref().unwrap_or_default();
        let html = self.fetch_page(base, id).await?;
        let episodes = extract_manifest_links(&html, true);
        debug!(source = %provider.key, id, count = episodes.len(), "scraped special source");
        Ok(VideoDetail {
            title: Some(SPECIAL_TITLE.to_string()),
            cover: None,
            desc: None,
            episodes,
            source_name: provider.name.clone(),
            source_code: provider.key.clone(),
        })
    }

    pub(crate) async fn scrape_custom(&self, id: &str, api_url: &str) -> Result<VideoDetail> {
        let html = self.fetch_page(api_url, id).await?;
        let episodes = extract_manifest_links(&html, false);
        debug!(api_url, id, count = episodes.len(), "scraped custom source");
        Ok(VideoDetail {
            title: Some(CUSTOM_TITLE.to_string()),
            cover: None,
            desc: None,
            episodes,
            source_name: CUSTOM_SOURCE_NAME.to_string(),
            source_code: CUSTOM_KEY.to_string(),
        })
    }

    /// Single best-effort page fetch; the status code is not inspected.
    async fn fetch_page(&self, base: &str, id: &str) -> Result<String> {
        let url = format!("{}{}", base, self.settings().endpoints.scrape_path.replace("{id}", id));
        let request = FetchRequest::new(url).timeout(self.settings().timeouts.scrape());
        Ok(self.fetcher().fetch(request).await?.body)
    }
}
