pub mod aggregator;
pub mod api;
pub mod config;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod playlist;
pub mod registry;
pub mod scrape;
pub mod search;
pub mod server;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::api::ApiRouter;
    pub use crate::config::Settings;
    pub use crate::error::{Error, Result};
    pub use crate::fetch::{FetchError, FetchRequest, FetchResponse, Fetcher, ProxyFetcher};
    pub use crate::registry::{ProviderDescriptor, ProviderRegistry};
    pub use crate::types::{ResultEnvelope, SearchResultItem, VideoDetail, VideoInfo};
    pub use crate::VodHub;
}

use std::sync::Arc;

pub use crate::error::{Error, Result};

use crate::config::Settings;
use crate::fetch::{Fetcher, ProxyFetcher};
use crate::registry::{ProviderDescriptor, ProviderRegistry, CUSTOM_KEY, CUSTOM_SOURCE_NAME};

/// Library entry point. Owns the provider table, the settings and the outbound fetcher.
///
/// Holds no per-request state, so one instance can be shared behind an `Arc`.
pub struct VodHub {
    settings: Settings,
    registry: ProviderRegistry,
    fetcher: Arc<dyn Fetcher>,
}

impl VodHub {
    /// Build with the production [`ProxyFetcher`] configured from `settings.proxy_url`.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let fetcher = ProxyFetcher::new(settings.proxy_url.clone())?;
        Self::with_fetcher(settings, Arc::new(fetcher))
    }

    pub fn with_fetcher(settings: Settings, fetcher: Arc<dyn Fetcher>) -> anyhow::Result<Self> {
        let registry = ProviderRegistry::new(settings.providers.clone())?;
        Ok(Self { settings, registry, fetcher })
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn registry(&self) -> &ProviderRegistry { &self.registry }

    pub(crate) fn fetcher(&self) -> &dyn Fetcher { self.fetcher.as_ref() }

    /// Map a `source` key plus an optional custom endpoint onto the upstream to call.
    pub(crate) fn resolve_target<'a>(&'a self, source: &str, custom_api: Option<&'a str>) -> Result<Target<'a>> {
        let custom = custom_api.map(str::trim).filter(|u| !u.is_empty());
        if source == CUSTOM_KEY {
            return custom.map(Target::Custom).ok_or_else(|| Error::invalid("custom API url must not be empty"));
        }
        match (self.registry.get(source), custom) {
            (Some(p), _) => Ok(Target::Provider(p)),
            (None, Some(url)) => Ok(Target::Custom(url)),
            (None, None) => Err(Error::invalid(format!("unknown API source `{source}`"))),
        }
    }
}

/// Upstream selected for a single-call operation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target<'a> {
    Provider(&'a ProviderDescriptor),
    Custom(&'a str),
}

impl<'a> Target<'a> {
    pub(crate) fn api_base(&self) -> &'a str {
        match *self {
            Target::Provider(p) => &p.api,
            Target::Custom(url) => url,
        }
    }

    pub(crate) fn source_name(&self) -> &'a str {
        match *self {
            Target::Provider(p) => &p.name,
            Target::Custom(_) => CUSTOM_SOURCE_NAME,
        }
    }

    pub(crate) fn source_code(&self) -> &'a str {
        match *self {
            Target::Provider(p) => &p.key,
            Target::Custom(_) => CUSTOM_KEY,
        }
    }

    pub(crate) fn api_url(&self) -> Option<&'a str> {
        match *self {
            Target::Provider(_) => None,
            Target::Custom(url) => Some(url),
        }
    }
}
