use std::cmp::Ordering;
use std::collections::HashSet;

use futures::future::join_all;
use icu_collator::{Collator, CollatorOptions};
use tracing::{info, warn};

use crate::registry::CUSTOM_KEY;
use crate::search::take_list;
use crate::types::SearchResultItem;
use crate::VodHub;

impl VodHub {
    /// Search every registered provider at once; merge, dedupe and sort by title.
    ///
    /// A provider that fails or times out contributes nothing; the merge itself never fails.
    pub async fn search_aggregated(&self, query: &str) -> Vec<SearchResultItem> {
        let calls = self
            .registry()
            .searchable()
            .map(|p| self.search_isolated(&p.api, query, &p.name, &p.key, None));
        let lists = join_all(calls).await;

        let mut merged = merge_unique(lists.into_iter().flatten());
        merged.sort_by(|a, b| collate(a.vod_name(), b.vod_name()));
        info!(query, count = merged.len(), "aggregated search complete");
        merged
    }

    /// Search up to `max_custom_apis` comma-separated custom endpoints in parallel.
    /// Results are concatenated as-is, without dedupe or sort.
    pub async fn search_custom_many(&self, query: &str, custom_apis: &str) -> Vec<SearchResultItem> {
        let urls = split_custom_apis(custom_apis, self.settings().max_custom_apis);
        let labels: Vec<String> = (1..=urls.len()).map(|i| format!("custom{i}")).collect();
        let calls = urls
            .iter()
            .zip(&labels)
            .map(|(&url, label)| self.search_isolated(url, query, label, CUSTOM_KEY, Some(url)));
        join_all(calls).await.into_iter().flatten().collect()
    }

    async fn search_isolated(
        &self,
        base: &str,
        query: &str,
        source_name: &str,
        source_code: &str,
        api_url: Option<&str>,
    ) -> Vec<SearchResultItem> {
        let url = self.search_url(base, query);
        match self.fetch_json(url, Some(self.settings().timeouts.aggregate())).await {
            Ok(body) => take_list(body)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|raw| SearchResultItem::stamp(raw, source_name, source_code, api_url))
                .collect(),
            Err(e) => {
                warn!(source = source_name, base, error = %e, "search branch dropped");
                Vec::new()
            }
        }
    }
}

/// Trimmed `http*` entries of a comma-separated list, at most `cap` of them.
pub fn split_custom_apis(raw: &str, cap: usize) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|u| u.starts_with("http")).take(cap).collect()
}

/// Drop items whose `source_code_vod_id` key was already seen; first occurrence wins.
pub fn merge_unique<I>(items: I) -> Vec<SearchResultItem>
where
    I: IntoIterator<Item = SearchResultItem>,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.dedup_key())).collect()
}

thread_local! {
    static ROOT_COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Title ordering under the Unicode root collation (punctuation before letters, accents
/// secondary, lowercase before uppercase). Code point order breaks remaining ties.
pub fn collate(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR
        .with(|collator| collator.as_ref().map_or(Ordering::Equal, |c| c.compare(a, b)))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(code: &str, id: i64, name: Option<&str>) -> SearchResultItem {
        let mut raw = json!({"vod_id": id});
        if let Some(n) = name { raw["vod_name"] = json!(n); }
        SearchResultItem::stamp(raw, code, code, None).unwrap()
    }

    #[test]
    fn custom_list_is_trimmed_filtered_and_capped() {
        let raw = " https://a.test ,ftp://x, http://b.test,,https://c.test,https://d.test,https://e.test,https://f.test";
        assert_eq!(
            split_custom_apis(raw, 5),
            ["https://a.test", "http://b.test", "https://c.test", "https://d.test", "https://e.test"]
        );
    }

    #[test]
    fn eight_candidates_become_five() {
        let raw = (1..=8).map(|i| format!("https://s{i}.test")).collect::<Vec<_>>().join(",");
        assert_eq!(split_custom_apis(&raw, 5).len(), 5);
    }

    #[test]
    fn dedupe_keeps_first_seen() {
        let merged = merge_unique(vec![item("a", 1, Some("first")), item("b", 1, None), item("a", 1, Some("second"))]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].vod_name(), "first");
        assert_eq!(merged[1].source_code, "b");
    }

    #[test]
    fn collate_orders_titles() {
        let mut titles = vec!["beta", "", "Alpha", "alpha", "Beta", "gamma"];
        titles.sort_by(|a, b| collate(a, b));
        assert_eq!(titles, ["", "alpha", "Alpha", "beta", "Beta", "gamma"]);
    }

    #[test]
    fn collate_handles_accents_and_cjk_punctuation() {
        let mut titles = vec!["fast", "été", "abc", "《abc》", "Zoo"];
        titles.sort_by(|a, b| collate(a, b));
        assert_eq!(titles, ["《abc》", "abc", "été", "fast", "Zoo"]);
    }

    #[test]
    fn missing_title_sorts_first() {
        let mut items = vec![item("a", 1, Some("Zed")), item("a", 2, None), item("a", 3, Some("Ant"))];
        items.sort_by(|a, b| collate(a.vod_name(), b.vod_name()));
        let ids: Vec<_> = items.iter().map(SearchResultItem::vod_id).collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }
}
