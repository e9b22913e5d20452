//! 远程服务集成测试
//!
//! 在本地启动模拟服务器，验证页面抓取器和 Google 翻译提供者的 HTTP 行为。

#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Json, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use url::Url;

use wordtap::core::WordtapError;
use wordtap::network::{DocumentFetcher, FetchConfig, HttpFetcher};
use wordtap::translation::{
    GoogleTranslateProvider, TranslationConfig, TranslationError, TranslationProvider,
    TranslationService,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::spawn_server;

const TRANSLATE_PATH: &str = "/language/translate/v2";

fn fetcher(max_document_bytes: usize) -> HttpFetcher {
    HttpFetcher::new(FetchConfig {
        timeout: Duration::from_secs(2),
        max_document_bytes,
        ..FetchConfig::default()
    })
    .unwrap()
}

async fn page_server() -> String {
    let router = Router::new()
        .route(
            "/article",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    "<p>caf\u{e9}</p>",
                )
            }),
        )
        .route("/gone", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/image.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8, 0x50, 0x4e, 0x47]) }),
        )
        .route(
            "/large",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "x".repeat(4096)) }),
        );
    spawn_server(router).await
}

/// 记录收到的请求，按词典翻译
#[derive(Clone, Default)]
struct TranslateBackend {
    requests: Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>,
}

async fn translate_ok(
    State(backend): State<TranslateBackend>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    backend
        .requests
        .lock()
        .unwrap()
        .push((query.get("key").cloned(), body.clone()));

    let dictionary = HashMap::from([("cat", "猫"), ("dog", "犬")]);
    let translations: Vec<serde_json::Value> = body["q"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| {
            let q = q.as_str().unwrap();
            let text = dictionary.get(q).map(|t| t.to_string()).unwrap_or_else(|| q.to_uppercase());
            serde_json::json!({"translatedText": text, "detectedSourceLanguage": "en"})
        })
        .collect();

    axum::Json(serde_json::json!({"data": {"translations": translations}}))
}

async fn translate_server(backend: TranslateBackend) -> String {
    let router = Router::new()
        .route(TRANSLATE_PATH, post(translate_ok))
        .with_state(backend);
    spawn_server(router).await
}

async fn failing_translate_server(status: StatusCode, body: &'static str) -> String {
    let router = Router::new().route(
        TRANSLATE_PATH,
        post(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
    );
    spawn_server(router).await
}

fn translation_config(base: &str) -> TranslationConfig {
    TranslationConfig {
        api_key: Some("test-key".to_string()),
        endpoint: format!("{}{}", base, TRANSLATE_PATH),
        timeout: Duration::from_secs(2),
        ..TranslationConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_html_page() {
    let base = page_server().await;
    let url = Url::parse(&format!("{}/article#section", base)).unwrap();

    let document = fetcher(1024).fetch(&url).await.unwrap();

    assert_eq!(document.url.path(), "/article");
    assert_eq!(document.media_type, "text/html");
    assert_eq!(document.charset.as_deref(), Some("utf-8"));
    assert_eq!(document.data, "<p>café</p>".as_bytes());
}

#[tokio::test]
async fn test_fetch_reports_http_errors() {
    let base = page_server().await;
    let url = Url::parse(&format!("{}/gone", base)).unwrap();

    let error = fetcher(1024).fetch(&url).await.unwrap_err();
    assert!(matches!(error, WordtapError::Fetch(ref message) if message.contains("404")));
}

#[tokio::test]
async fn test_fetch_rejects_non_html() {
    let base = page_server().await;
    let url = Url::parse(&format!("{}/image.png", base)).unwrap();

    let error = fetcher(1024).fetch(&url).await.unwrap_err();
    assert!(matches!(error, WordtapError::UnsupportedMedia(ref media) if media == "image/png"));
}

#[tokio::test]
async fn test_fetch_enforces_size_limit() {
    let base = page_server().await;
    let url = Url::parse(&format!("{}/large", base)).unwrap();

    let error = fetcher(1024).fetch(&url).await.unwrap_err();
    assert!(matches!(error, WordtapError::Fetch(_)));
    assert!(fetcher(8192).fetch(&url).await.is_ok());
}

#[tokio::test]
async fn test_fetch_unreachable_host() {
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let error = fetcher(1024).fetch(&url).await.unwrap_err();
    assert!(matches!(error, WordtapError::Fetch(_)));
}

#[tokio::test]
async fn test_google_provider_translates_batch() {
    let backend = TranslateBackend::default();
    let base = translate_server(backend.clone()).await;

    let provider = GoogleTranslateProvider::new(&translation_config(&base)).unwrap();
    let translations = provider
        .translate_batch(&["cat".to_string(), "dog".to_string()], "ja")
        .await
        .unwrap();
    assert_eq!(translations, vec!["猫", "犬"]);

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.as_deref(), Some("test-key"));
    assert_eq!(
        requests[0].1,
        serde_json::json!({"q": ["cat", "dog"], "target": "ja", "format": "text"})
    );
}

#[tokio::test]
async fn test_google_provider_sends_source_language() {
    let backend = TranslateBackend::default();
    let base = translate_server(backend.clone()).await;

    let config = TranslationConfig {
        source_lang: Some("en".to_string()),
        ..translation_config(&base)
    };
    let provider = GoogleTranslateProvider::new(&config).unwrap();
    assert_eq!(provider.translate("cat", "ja").await.unwrap(), "猫");

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests[0].1["source"], "en");
}

#[tokio::test]
async fn test_google_provider_splits_large_batches() {
    let backend = TranslateBackend::default();
    let base = translate_server(backend.clone()).await;

    let config = TranslationConfig {
        batch_size: 2,
        ..translation_config(&base)
    };
    let provider = GoogleTranslateProvider::new(&config).unwrap();
    let words: Vec<String> = ["a", "b", "c", "d"].iter().map(|w| w.to_string()).collect();
    let translations = provider.translate_batch(&words, "ja").await.unwrap();

    assert_eq!(translations, vec!["A", "B", "C", "D"]);
    assert_eq!(backend.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_google_provider_error_body() {
    let base = failing_translate_server(
        StatusCode::FORBIDDEN,
        r#"{"error": {"code": 403, "message": "Daily Limit Exceeded", "errors": []}}"#,
    )
    .await;

    let provider = GoogleTranslateProvider::new(&translation_config(&base)).unwrap();
    let error = provider.translate("cat", "ja").await.unwrap_err();
    assert_eq!(
        error,
        TranslationError::ProviderError {
            status: 403,
            message: "Daily Limit Exceeded".to_string(),
        }
    );
}

#[tokio::test]
async fn test_google_provider_mismatched_response() {
    let base = failing_translate_server(StatusCode::OK, r#"{"data": {"translations": []}}"#).await;

    let provider = GoogleTranslateProvider::new(&translation_config(&base)).unwrap();
    let error = provider.translate("cat", "ja").await.unwrap_err();
    assert!(matches!(error, TranslationError::ResponseError(_)));
}

#[tokio::test]
async fn test_service_degrades_on_server_error() {
    let base = failing_translate_server(StatusCode::INTERNAL_SERVER_ERROR, "backend unavailable").await;

    let service = TranslationService::from_config(translation_config(&base));
    assert!(service.is_enabled());

    let lookup = service.lookup("cat", Some("ja")).await.unwrap();
    assert!(lookup.degraded);

    let translations = service.translate_many(vec!["cat".to_string()], "ja").await;
    assert!(translations.is_empty());
}

#[tokio::test]
async fn test_service_translates_many_words() {
    let base = translate_server(TranslateBackend::default()).await;
    let service = TranslationService::from_config(translation_config(&base));

    let translations = service
        .translate_many(vec!["cat".to_string(), "dog".to_string(), "owl".to_string()], "ja")
        .await;
    assert_eq!(translations.len(), 3);
    assert_eq!(translations["owl"], "OWL");
}
