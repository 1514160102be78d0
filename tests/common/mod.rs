#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use vodhub::config::Settings;
use vodhub::fetch::{FetchError, FetchRequest, FetchResponse, Fetcher};
use vodhub::registry::ProviderDescriptor;
use vodhub::VodHub;

#[derive(Clone)]
pub enum Reply {
    Json(u16, Value),
    Html(String),
    Fail,
    /// Sleeps past the request timeout, then reports it.
    Hang,
    Panic,
}

/// In-memory fetcher. The first route whose needle occurs in the target URL answers.
#[derive(Default)]
pub struct MockFetcher {
    routes: Mutex<Vec<(String, Reply)>>,
    calls: Mutex<Vec<FetchRequest>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn route(self: &Arc<Self>, needle: &str, reply: Reply) -> Arc<Self> {
        self.routes.lock().unwrap().push((needle.to_string(), reply));
        self.clone()
    }

    pub fn calls(&self) -> Vec<FetchRequest> { self.calls.lock().unwrap().clone() }

    pub fn targets(&self) -> Vec<String> { self.calls().into_iter().map(|c| c.target).collect() }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.lock().unwrap().push(request.clone());
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| request.target.contains(needle.as_str()))
            .map(|(_, r)| r.clone());

        match reply {
            Some(Reply::Json(status, body)) => Ok(FetchResponse { status, body: body.to_string() }),
            Some(Reply::Html(body)) => Ok(FetchResponse { status: 200, body }),
            Some(Reply::Fail) | None => Err(FetchError::Transport("connection refused".to_string())),
            Some(Reply::Hang) => {
                let limit = request.timeout.unwrap_or(Duration::from_secs(30));
                tokio::time::sleep(limit).await;
                Err(FetchError::Timeout(limit))
            }
            Some(Reply::Panic) => panic!("fetcher blew up on {}", request.target),
        }
    }
}

pub fn provider(key: &str, name: &str) -> ProviderDescriptor {
    ProviderDescriptor {
        key: key.to_string(),
        name: name.to_string(),
        api: format!("https://{key}.test/api.php/provide/vod"),
        detail: None,
    }
}

pub fn special_provider(key: &str, name: &str) -> ProviderDescriptor {
    ProviderDescriptor { detail: Some(format!("https://www.{key}.test")), ..provider(key, name) }
}

pub fn settings(providers: Vec<ProviderDescriptor>) -> Settings {
    let mut settings = Settings::default();
    if let Some(first) = providers.first() { settings.default_source = first.key.clone(); }
    settings.providers = providers;
    settings
}

pub fn hub(settings: Settings, fetcher: &Arc<MockFetcher>) -> VodHub {
    VodHub::with_fetcher(settings, fetcher.clone()).unwrap()
}
