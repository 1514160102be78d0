//! ProxyFetcher and VodHub against a local HTTP mock.

use std::time::Duration;

use serde_json::json;
use vodhub::config::Settings;
use vodhub::fetch::{FetchError, FetchRequest, Fetcher, ProxyFetcher};
use vodhub::registry::ProviderDescriptor;
use vodhub::VodHub;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetches_directly_without_proxy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(header("User-Agent", "vodhub-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::new(None).unwrap();
    let request = FetchRequest::new(format!("{}/api", server.uri())).headers([("User-Agent", "vodhub-test")]);
    let resp = fetcher.fetch(request).await.unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn routes_encoded_target_through_proxy_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/proxy/https%3A%2F%2Fcms\.test%2Fapi\.php%3Fac%3Dvideolist%26wd%3D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::new(Some(format!("{}/proxy/", server.uri()))).unwrap();
    let resp = fetcher
        .fetch(FetchRequest::new("https://cms.test/api.php?ac=videolist&wd=night%20train"))
        .await
        .unwrap();
    assert!(resp.is_success());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].url.query().is_none(), "target must not leak into the proxy query");
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::new(None).unwrap();
    let resp = fetcher.fetch(FetchRequest::new(server.uri())).await.unwrap();
    assert_eq!(resp.status, 502);
    assert!(!resp.is_success());
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::new(None).unwrap();
    let limit = Duration::from_millis(50);
    let err = fetcher.fetch(FetchRequest::new(server.uri()).timeout(Some(limit))).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout(t) if t == limit), "got {err:?}");
}

#[tokio::test]
async fn unparsable_target_is_invalid_url() {
    let fetcher = ProxyFetcher::new(None).unwrap();
    let err = fetcher.fetch(FetchRequest::new("not a url")).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
}

#[tokio::test]
async fn hub_searches_a_live_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php/provide/vod"))
        .and(query_param("ac", "videolist"))
        .and(query_param("wd", "night train"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1,
            "list": [{"vod_id": 11, "vod_name": "Night Train", "vod_remarks": "HD"}]
        })))
        .mount(&server)
        .await;

    let mut settings = Settings::default();
    settings.providers = vec![ProviderDescriptor {
        key: "heimuer".to_string(),
        name: "Heimuer".to_string(),
        api: format!("{}/api.php/provide/vod", server.uri()),
        detail: None,
    }];
    let hub = VodHub::new(settings).unwrap();

    let items = hub.search("night train", "heimuer", None).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].vod_name(), "Night Train");
    assert_eq!(items[0].fields["vod_remarks"], "HD");
    assert_eq!(items[0].source_code, "heimuer");
}
