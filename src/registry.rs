use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Key that routes a search to every registered provider.
pub const AGGREGATED_KEY: &str = "aggregated";
/// Key that routes a request to a caller-supplied endpoint.
pub const CUSTOM_KEY: &str = "custom";
pub const CUSTOM_SOURCE_NAME: &str = "Custom source";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub key: String,
    pub name: String,
    /// Base URL of the structured JSON API.
    pub api: String,
    /// Base URL of the HTML site; present only for scrape-only providers.
    #[serde(default)]
    pub detail: Option<String>,
}

impl ProviderDescriptor {
    pub fn is_special(&self) -> bool { self.detail.as_deref().is_some_and(|d| !d.trim().is_empty()) }
}

/// Immutable provider table, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(providers.len());
        for (i, p) in providers.iter().enumerate() {
            if p.key.trim().is_empty() { bail!("provider #{} has an empty key", i + 1); }
            if p.key == CUSTOM_KEY { bail!("provider key `{}` is reserved", CUSTOM_KEY); }
            url::Url::parse(&p.api).with_context(|| format!("provider `{}` has an invalid api url", p.key))?;
            if let Some(d) = p.detail.as_deref().filter(|d| !d.trim().is_empty()) {
                url::Url::parse(d).with_context(|| format!("provider `{}` has an invalid detail url", p.key))?;
            }
            if index.insert(p.key.clone(), i).is_some() { bail!("duplicate provider key `{}`", p.key); }
        }
        Ok(Self { providers, index })
    }

    pub fn get(&self, key: &str) -> Option<&ProviderDescriptor> { self.index.get(key).map(|&i| &self.providers[i]) }

    pub fn contains(&self, key: &str) -> bool { self.index.contains_key(key) }

    pub fn all(&self) -> &[ProviderDescriptor] { &self.providers }

    /// Providers that take part in an aggregated search.
    pub fn searchable(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter().filter(|p| p.key != AGGREGATED_KEY && p.key != CUSTOM_KEY)
    }

    pub fn is_empty(&self) -> bool { self.providers.is_empty() }
}
