//! Web 模块的数据类型定义

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::{DocumentProcessor, PageOptions};
use crate::network::DocumentFetcher;
use crate::translation::TranslationService;

/// 应用状态
///
/// 启动后只读，在请求之间共享。
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub translator: TranslationService,
    pub processor: DocumentProcessor,
    pub mode: String,
}

impl AppState {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        translator: TranslationService,
        page_options: PageOptions,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            translator,
            processor: DocumentProcessor::new(page_options),
            mode: mode.into(),
        }
    }

    pub fn page_options(&self) -> &PageOptions {
        self.processor.options()
    }
}

/// 代理页面查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    pub lang: Option<String>,
}

/// 查词查询参数
#[derive(Debug, Default, Deserialize)]
pub struct TranslateQuery {
    #[serde(alias = "word")]
    pub text: Option<String>,
    pub lang: Option<String>,
}

/// 查词请求体
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(alias = "word")]
    pub text: String,
    pub lang: Option<String>,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub translation_enabled: bool,
    pub mode: String,
}

/// API 错误响应
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}
