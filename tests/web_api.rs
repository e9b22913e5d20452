//! Web 路由集成测试
//!
//! 在进程内驱动路由器，覆盖代理页面、查词 API 和健康检查。

#![cfg(feature = "web")]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use wordtap::core::PageOptions;
use wordtap::translation::{constants, DisabledProvider, TranslationProvider};
use wordtap::web::{create_router, AppState};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{test_state, MockProvider, StaticFetcher};

const PAGE_URL: &str = "https://example.com/story.html";
const PAGE: &str = "<html><head><title>Story</title></head>\
                    <body><p style=\"font-size: 12px\">The cat sat.</p>\
                    <a href=\"/next.html\">next</a></body></html>";

fn fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_page(PAGE_URL, PAGE)
        .with_response("https://example.com/data.json", "application/json", b"{}")
}

fn state(provider: Arc<dyn TranslationProvider>) -> Arc<AppState> {
    test_state(fetcher(), provider, PageOptions::default())
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, String) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post_json(state: Arc<AppState>, uri: &str, json: serde_json::Value) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    let response = create_router(state).oneshot(request).await.unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, String) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_index_page_has_form() {
    let (status, body) = get(state(Arc::new(MockProvider::working())), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("action=\"/proxy\""));
    assert!(body.contains("開く"));
    assert!(body.contains("id=\"wordtap-font-size-slider\""));
}

#[tokio::test]
async fn test_proxy_renders_interactive_page() {
    let uri = "/proxy?url=https%3A%2F%2Fexample.com%2Fstory.html&lang=ja";
    let (status, body) = get(state(Arc::new(MockProvider::working())), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<span class=\"wordtap-word\">cat</span>"));
    assert!(body.contains("font-size:30px"));
    assert!(body.contains("href=\"/proxy?url=https%3A%2F%2Fexample.com%2Fnext.html&amp;lang=ja\""));
    assert!(body.contains("value=\"https://example.com/story.html\""));
}

#[tokio::test]
async fn test_proxy_accepts_url_without_scheme() {
    let (status, body) = get(
        state(Arc::new(MockProvider::working())),
        "/proxy?url=example.com%2Fstory.html",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("wordtap-word"));
}

#[tokio::test]
async fn test_proxy_invalid_lang_falls_back() {
    let (status, body) = get(
        state(Arc::new(MockProvider::working())),
        "/proxy?url=https%3A%2F%2Fexample.com%2Fstory.html&lang=%3Cscript%3E",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-lang=\"ja\""));
}

#[tokio::test]
async fn test_proxy_prefetches_tooltips() {
    let options = PageOptions {
        prefetch_tooltips: true,
        ..PageOptions::default()
    };
    let state = test_state(fetcher(), Arc::new(MockProvider::working()), options);
    let (status, body) = get(state, "/proxy?url=https%3A%2F%2Fexample.com%2Fstory.html").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<span class=\"wordtap-word\" title=\"猫\">cat</span>"));
    assert!(body.contains("<span class=\"wordtap-word\" title=\"sat-tr\">sat</span>"));
}

#[tokio::test]
async fn test_proxy_requires_url() {
    let (status, body) = get(state(Arc::new(MockProvider::working())), "/proxy").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("url パラメータが必要です"));

    let (status, _) = get(state(Arc::new(MockProvider::working())), "/proxy?url=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proxy_rejects_unsupported_scheme() {
    let (status, _) = get(
        state(Arc::new(MockProvider::working())),
        "/proxy?url=ftp%3A%2F%2Fexample.com%2Ffile",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proxy_fetch_failure_is_bad_gateway() {
    let (status, body) = get(
        state(Arc::new(MockProvider::working())),
        "/proxy?url=https%3A%2F%2Fexample.com%2Fmissing.html",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("エラーが発生しました"));
    assert!(body.contains("ページを取得できませんでした"));
    assert!(!body.contains("missing.html"));
    assert!(!body.contains("404"));
}

#[tokio::test]
async fn test_proxy_non_html_is_bad_gateway() {
    let (status, _) = get(
        state(Arc::new(MockProvider::working())),
        "/proxy?url=https%3A%2F%2Fexample.com%2Fdata.json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_translate_returns_translation() {
    let (status, body) = get(
        state(Arc::new(MockProvider::working())),
        "/api/translate?text=cat&lang=ja",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        serde_json::json!({"text": "cat", "lang": "ja", "translation": "猫", "degraded": false})
    );
}

#[tokio::test]
async fn test_translate_accepts_word_alias_and_default_lang() {
    let (status, body) = get(state(Arc::new(MockProvider::working())), "/api/translate?word=dog").await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["translation"], "犬");
    assert_eq!(body["lang"], "ja");
}

#[tokio::test]
async fn test_translate_post_json() {
    let (status, body) = post_json(
        state(Arc::new(MockProvider::working())),
        "/api/translate",
        serde_json::json!({"text": " cat ", "lang": "ja"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["text"], "cat");
}

#[tokio::test]
async fn test_translate_post_rejects_bad_body() {
    let state = state(Arc::new(MockProvider::working()));

    let (status, body) = post_json(
        state.clone(),
        "/api/translate",
        serde_json::json!({"lang": "ja"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/translate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = read(create_router(state.clone()).oneshot(request).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/translate")
        .body(Body::from(r#"{"text": "cat"}"#))
        .unwrap();
    let (status, body) = read(create_router(state).oneshot(request).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());
}

#[tokio::test]
async fn test_translate_degrades_when_provider_fails() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = get(state(provider.clone()), "/api/translate?text=cat&lang=ja").await;

    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["degraded"], true);
    assert_eq!(body["translation"], constants::UNAVAILABLE_MARKER);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_translate_degrades_on_timeout() {
    let provider = Arc::new(MockProvider::slow(Duration::from_secs(5)));
    let (status, body) = get(state(provider), "/api/translate?text=cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["degraded"], true);
}

#[tokio::test]
async fn test_translate_degrades_when_unconfigured() {
    let (status, body) = get(state(Arc::new(DisabledProvider)), "/api/translate?text=anything").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["degraded"], true);
}

#[tokio::test]
async fn test_translate_rejects_bad_input() {
    let state = state(Arc::new(MockProvider::working()));

    let (status, body) = get(state.clone(), "/api/translate?text=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());

    let (status, _) = get(state.clone(), "/api/translate").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "a".repeat(201);
    let (status, _) = get(state.clone(), &format!("/api/translate?text={}", long)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(state, "/api/translate?text=cat&lang=not_a_lang").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(state(Arc::new(DisabledProvider)), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        serde_json::json!({"status": "ok", "translation_enabled": false, "mode": "development"})
    );
}
