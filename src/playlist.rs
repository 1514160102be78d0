//! Play-group decoding and manifest sniffing.
//!
//! Upstream detail records pack every mirror into one string:
//! `label$url#label$url$$$label$url#...`. Groups are split on `$$$`, episodes on `#`,
//! and the label from the URL on `$`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

pub const GROUP_DELIMITER: &str = "$$$";
pub const EPISODE_DELIMITER: char = '#';
pub const LABEL_DELIMITER: char = '$';

const MANIFEST_EXT: &str = ".m3u8";

/// `$` immediately followed by an absolute http(s) URL, as found in free-text descriptions.
static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\$(https?://[^\s"'<>#$]+)"#).expect("valid inline link regex"));

/// Decode a raw play-url field into ordered groups of filtered episode URLs.
///
/// An empty field has no groups at all.
pub fn parse_play_groups(raw: &str) -> Vec<Vec<String>> {
    if raw.is_empty() { return Vec::new(); }
    raw.split(GROUP_DELIMITER).map(parse_group).collect()
}

fn parse_group(group: &str) -> Vec<String> {
    group
        .split(EPISODE_DELIMITER)
        .map(|ep| ep.split(LABEL_DELIMITER).nth(1).unwrap_or(ep))
        .filter(|link| !link.is_empty() && link.starts_with("http"))
        .map(str::to_string)
        .collect()
}

/// Group indices in probing order: 1, 0, then 2.. ascending.
pub fn probe_order(group_count: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(group_count);
    if group_count > 1 { order.push(1); }
    if group_count > 0 { order.push(0); }
    order.extend(2..group_count);
    order
}

pub fn is_manifest(link: &str) -> bool { link.to_ascii_lowercase().contains(MANIFEST_EXT) }

/// Pick the episode list to play.
///
/// The first group in probe order holding any manifest link wins. Without one, group 0
/// is used as-is, even when empty.
pub fn select_episodes(groups: &[Vec<String>]) -> Vec<String> {
    for idx in probe_order(groups.len()) {
        if groups[idx].iter().any(|l| is_manifest(l)) {
            debug!(group = idx, episodes = groups[idx].len(), "manifest group selected");
            return groups[idx].clone();
        }
    }
    groups.first().cloned().unwrap_or_default()
}

/// Every `$http...` link in `text`, in order, without the leading `$`.
pub fn links_from_text(text: &str) -> Vec<String> {
    INLINE_LINK.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str().to_string()).collect()
}

/// Full episode resolution for one detail record: sniff the play groups, then fall back
/// to links embedded in the description.
pub fn resolve_episodes(play_url: Option<&str>, description: Option<&str>) -> Vec<String> {
    let groups = parse_play_groups(play_url.unwrap_or_default());
    let mut episodes = select_episodes(&groups);
    if episodes.is_empty() {
        if let Some(text) = description {
            episodes = links_from_text(text);
            if !episodes.is_empty() { debug!(count = episodes.len(), "episodes recovered from description"); }
        }
    }
    episodes
}
