use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream transport error: {0}")]
    Transport(String),
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
}

/// One outbound call. `target` is the real upstream URL; the fetcher decides how to reach it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into(), headers: Vec::new(), timeout: None }
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where I: IntoIterator<Item = (K, V)>, K: Into<String>, V: Into<String> {
        self.headers.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> { serde_json::from_str(&self.body) }
}

/// The "fetch through proxy" capability consumed by the resolver and the mergers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Percent-encodes every byte outside `A-Z a-z 0-9 - _ . ~`.
pub fn encode_target(target: &str) -> String { urlencoding::encode(target).into_owned() }

/// Production fetcher: prefixes the encoded target with the proxy address, or calls it directly
/// when no proxy is configured.
#[derive(Clone)]
pub struct ProxyFetcher {
    client: reqwest::Client,
    proxy_url: Option<String>,
}

impl ProxyFetcher {
    pub fn new(proxy_url: Option<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, proxy_url))
    }

    pub fn with_client(client: reqwest::Client, proxy_url: Option<String>) -> Self {
        let proxy_url = proxy_url.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        Self { client, proxy_url }
    }

    pub fn proxy_url(&self) -> Option<&str> { self.proxy_url.as_deref() }

    /// The URL actually put on the wire for `target`.
    pub fn wire_url(&self, target: &str) -> String {
        match &self.proxy_url {
            Some(prefix) => format!("{}{}", prefix, encode_target(target)),
            None => target.to_string(),
        }
    }
}

#[async_trait]
impl Fetcher for ProxyFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let wire = self.wire_url(&request.target);
        let url = url::Url::parse(&wire).map_err(|e| FetchError::InvalidUrl(format!("{wire}: {e}")))?;

        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            let (Ok(name), Ok(value)) = (HeaderName::from_bytes(k.as_bytes()), HeaderValue::from_str(v)) else {
                debug!(header = %k, "skipping invalid request header");
                continue;
            };
            headers.insert(name, value);
        }

        let mut builder = self.client.get(url).headers(headers);
        if let Some(t) = request.timeout { builder = builder.timeout(t); }

        let map_err = |e: reqwest::Error| match request.timeout {
            Some(t) if e.is_timeout() => FetchError::Timeout(t),
            _ => FetchError::Transport(e.to_string()),
        };
        let resp = builder.send().await.map_err(map_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_err)?;
        debug!(target = %request.target, status, bytes = body.len(), "upstream fetch complete");
        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_target_fully() {
        assert_eq!(
            encode_target("https://a.test/api.php?ac=videolist&wd=x y"),
            "https%3A%2F%2Fa.test%2Fapi.php%3Fac%3Dvideolist%26wd%3Dx%20y"
        );
    }

    #[test]
    fn wire_url_prefixes_proxy() {
        let f = ProxyFetcher::with_client(reqwest::Client::new(), Some("http://127.0.0.1:8080/proxy/".into()));
        assert_eq!(f.wire_url("https://a.test/?q=1"), "http://127.0.0.1:8080/proxy/https%3A%2F%2Fa.test%2F%3Fq%3D1");
    }

    #[test]
    fn blank_proxy_means_direct() {
        let f = ProxyFetcher::with_client(reqwest::Client::new(), Some("  ".into()));
        assert!(f.proxy_url().is_none());
        assert_eq!(f.wire_url("https://a.test/x"), "https://a.test/x");
    }

    #[test]
    fn success_range() {
        let ok = FetchResponse { status: 204, body: String::new() };
        let bad = FetchResponse { status: 302, body: String::new() };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
