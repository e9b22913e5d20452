//! 翻译服务提供者
//!
//! `TranslationProvider` 是翻译后端的抽象；默认实现调用 Google Cloud Translation v2，
//! 未配置凭据时使用 `DisabledProvider`。

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译后端
#[async_trait]
pub trait TranslationProvider: Send + Sync + fmt::Debug {
    /// 提供者名称，用于日志和健康检查
    fn name(&self) -> &'static str;

    /// 是否可以真正发出翻译请求
    fn is_configured(&self) -> bool {
        true
    }

    /// 翻译单个文本
    async fn translate(&self, text: &str, target_lang: &str) -> TranslationResult<String>;

    /// 批量翻译，结果与输入一一对应
    async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.translate(text, target_lang).await?);
        }
        Ok(results)
    }
}

/// 未配置凭据时使用的提供者，所有请求都返回 `ConfigurationMissing`
#[derive(Debug, Default, Clone)]
pub struct DisabledProvider;

#[async_trait]
impl TranslationProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn translate(&self, _text: &str, _target_lang: &str) -> TranslationResult<String> {
        Err(TranslationError::ConfigurationMissing(
            "翻译服务未启用".to_string(),
        ))
    }

    async fn translate_batch(
        &self,
        _texts: &[String],
        _target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        Err(TranslationError::ConfigurationMissing(
            "翻译服务未启用".to_string(),
        ))
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequestBody<'a> {
    q: &'a [String],
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseBody {
    data: TranslateResponseData,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseData {
    translations: Vec<TranslatedItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedItem {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// Google Cloud Translation v2 提供者
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    source_lang: Option<String>,
    batch_size: usize,
}

impl fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("endpoint", &self.endpoint)
            .field("source_lang", &self.source_lang)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl GoogleTranslateProvider {
    /// 根据配置创建提供者；缺少密钥时返回 `ConfigurationMissing`
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TranslationError::ConfigurationMissing("缺少 API 密钥".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(crate::network::DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| TranslationError::NetworkError(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            source_lang: config.source_lang.clone(),
            batch_size: config.batch_size.clamp(1, constants::MAX_BATCH_SIZE),
        })
    }

    async fn request(&self, texts: &[String], target_lang: &str) -> TranslationResult<Vec<String>> {
        let body = TranslateRequestBody {
            q: texts,
            target: target_lang,
            format: "text",
            source: self.source_lang.as_deref(),
        };

        debug!("请求翻译: {} 项 -> {}", texts.len(), target_lang);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponseBody>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).trim().to_string());
            return Err(TranslationError::ProviderError {
                status: status.as_u16(),
                message,
            });
        }

        // 部分错误以 200 状态返回
        if let Ok(body) = serde_json::from_slice::<ErrorResponseBody>(&bytes) {
            return Err(TranslationError::ProviderError {
                status: body.error.code,
                message: body.error.message,
            });
        }

        let parsed: TranslateResponseBody = serde_json::from_slice(&bytes)?;
        if parsed.data.translations.len() != texts.len() {
            return Err(TranslationError::ResponseError(format!(
                "返回 {} 项译文，期望 {} 项",
                parsed.data.translations.len(),
                texts.len()
            )));
        }

        Ok(parsed
            .data
            .translations
            .into_iter()
            .map(|item| item.translated_text)
            .collect())
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        let texts = [text.to_string()];
        self.request(&texts, target_lang)
            .await?
            .pop()
            .ok_or_else(|| TranslationError::ResponseError("译文为空".to_string()))
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        let mut results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            results.extend(self.request(chunk, target_lang).await?);
        }
        Ok(results)
    }
}
