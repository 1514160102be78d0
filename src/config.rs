use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::registry::ProviderDescriptor;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Runtime settings, usually read from `vodhub.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Proxy prefix; the percent-encoded target URL is appended to it.
    pub proxy_url: Option<String>,
    /// Provider used when a request names none.
    pub default_source: String,
    pub bind: String,
    pub max_custom_apis: usize,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
    pub headers: BTreeMap<String, String>,
    pub providers: Vec<ProviderDescriptor>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Endpoints {
    pub search_path: String,
    pub detail_path: String,
    /// Page path under a provider's scrape base; `{id}` is replaced by the content id.
    pub scrape_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Timeouts {
    pub request_ms: u64,
    pub aggregate_ms: u64,
    pub check_ms: u64,
    pub scrape_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        let headers = BTreeMap::from([
            ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ]);
        Self {
            proxy_url: None,
            default_source: "heimuer".to_string(),
            bind: "127.0.0.1:8787".to_string(),
            max_custom_apis: 5,
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
            headers,
            providers: Vec::new(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search_path: "?ac=videolist&wd=".to_string(),
            detail_path: "?ac=videolist&ids=".to_string(),
            scrape_path: "/index.php/vod/detail/id/{id}.html".to_string(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self { Self { request_ms: 10_000, aggregate_ms: 8_000, check_ms: 5_000, scrape_ms: None } }
}

impl Timeouts {
    pub fn request(&self) -> Duration { Duration::from_millis(self.request_ms) }
    pub fn aggregate(&self) -> Duration { Duration::from_millis(self.aggregate_ms) }
    pub fn check(&self) -> Duration { Duration::from_millis(self.check_ms) }
    pub fn scrape(&self) -> Option<Duration> { self.scrape_ms.map(Duration::from_millis) }
}

impl Settings {
    /// Load settings from `path`, or from the default config location when `path` is None.
    /// A missing default file yields the built-in defaults (with no providers).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> { toml::from_str(raw).map_err(Into::into) }

    fn apply_env(&mut self) {
        if let Some(p) = std::env::var("VODHUB_PROXY_URL").ok().filter(|s| !s.trim().is_empty()) {
            self.proxy_url = Some(p);
        }
        if let Some(b) = std::env::var("VODHUB_BIND").ok().filter(|s| !s.trim().is_empty()) {
            self.bind = b;
        }
        if let Some(s) = std::env::var("VODHUB_DEFAULT_SOURCE").ok().filter(|s| !s.trim().is_empty()) {
            self.default_source = s;
        }
    }

    pub(crate) fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// `<config dir>/vodhub.toml` for the current platform.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "vodhub").map(|dirs| dirs.config_dir().join("vodhub.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_contract() {
        let s = Settings::default();
        assert_eq!(s.timeouts.request(), Duration::from_millis(10_000));
        assert_eq!(s.timeouts.aggregate(), Duration::from_millis(8_000));
        assert!(s.timeouts.scrape().is_none());
        assert_eq!(s.max_custom_apis, 5);
        assert_eq!(s.endpoints.search_path, "?ac=videolist&wd=");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let s = Settings::from_toml(r#"
            proxy_url = "http://127.0.0.1:9000/proxy/"

            [timeouts]
            request_ms = 2500

            [[providers]]
            key = "alpha"
            name = "Alpha"
            api = "https://alpha.test/api.php/provide/vod"
        "#).unwrap();
        assert_eq!(s.proxy_url.as_deref(), Some("http://127.0.0.1:9000/proxy/"));
        assert_eq!(s.timeouts.request_ms, 2500);
        assert_eq!(s.timeouts.aggregate_ms, 8_000);
        assert_eq!(s.default_source, "heimuer");
        assert_eq!(s.providers.len(), 1);
        assert!(s.providers[0].detail.is_none());
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vodhub.toml");
        std::fs::write(&path, "default_source = \"alpha\"\nmax_custom_apis = 3\n").unwrap();
        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.default_source, "alpha");
        assert_eq!(s.max_custom_apis, 3);
    }

    #[test]
    fn shipped_example_config_is_valid() {
        let s = Settings::from_toml(include_str!("../vodhub.example.toml")).unwrap();
        let registry = crate::registry::ProviderRegistry::new(s.providers.clone()).unwrap();
        assert!(registry.contains(&s.default_source));
        assert_eq!(registry.all().iter().filter(|p| p.is_special()).count(), 1);
        assert_eq!(s.headers["Accept"], "application/json");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::from_file(&dir.path().join("nope.toml")).is_err());
    }
}
