use tracing::debug;

use crate::error::{Error, Result};
use crate::playlist;
use crate::search::take_list;
use crate::types::{DetailRecord, VideoDetail};
use crate::{Target, VodHub};

/// Content ids are restricted to ASCII letters, digits, `_` and `-`.
pub fn is_valid_content_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl VodHub {
    /// Resolve one title into its playable episode list.
    ///
    /// Scrape-only providers (and custom endpoints when `scrape` is set) go through the
    /// HTML scraper; everything else fetches the structured record and sniffs its play
    /// groups for a manifest-bearing mirror.
    pub async fn detail(&self, id: &str, source: &str, custom_api: Option<&str>, scrape: bool) -> Result<VideoDetail> {
        if id.is_empty() { return Err(Error::invalid("missing video id")); }
        if !is_valid_content_id(id) { return Err(Error::invalid("invalid video id format")); }
        let target = self.resolve_target(source, custom_api)?;

        match target {
            Target::Provider(p) if p.is_special() => return self.scrape_special(id, p).await,
            Target::Custom(url) if scrape => return self.scrape_custom(id, url).await,
            _ => {}
        }

        let url = format!("{}{}{}", target.api_base(), self.settings().endpoints.detail_path, id);
        let body = self.fetch_json(url, Some(self.settings().timeouts.request())).await?;
        let first = take_list(body)
            .and_then(|list| list.into_iter().next())
            .ok_or_else(|| Error::upstream("upstream detail is empty"))?;
        let record: DetailRecord = serde_json::from_value(first)?;

        let episodes = playlist::resolve_episodes(record.vod_play_url.as_deref(), record.vod_content.as_deref());
        debug!(source = target.source_code(), id, count = episodes.len(), "detail resolved");
        Ok(VideoDetail {
            title: record.vod_name,
            cover: record.vod_pic,
            desc: record.vod_content,
            episodes,
            source_name: target.source_name().to_string(),
            source_code: target.source_code().to_string(),
        })
    }
}
