//! 翻译服务
//!
//! 在提供者之上增加输入校验、超时、失败降级和批量并发控制。
//! 服务本身只持有只读配置，可在请求之间自由克隆。

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::provider::{DisabledProvider, GoogleTranslateProvider, TranslationProvider};
use crate::utils::is_valid_lang_code;

/// 单词查询结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordLookup {
    pub text: String,
    pub lang: String,
    pub translation: String,
    /// 译文是占位值而非真实翻译
    pub degraded: bool,
}

/// 翻译服务
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
    config: Arc<TranslationConfig>,
}

impl TranslationService {
    pub fn new(provider: Arc<dyn TranslationProvider>, config: TranslationConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    /// 根据配置选择提供者；凭据缺失时返回关闭状态的服务
    pub fn from_config(config: TranslationConfig) -> Self {
        if !config.is_configured() {
            warn!("未配置翻译凭据，翻译功能已关闭");
            return Self::disabled(config);
        }

        match GoogleTranslateProvider::new(&config) {
            Ok(provider) => {
                info!("翻译服务已启用: {} ({})", provider.name(), config.endpoint);
                Self::new(Arc::new(provider), config)
            }
            Err(e) => {
                warn!("翻译服务初始化失败，翻译功能已关闭: {}", e);
                Self::disabled(config)
            }
        }
    }

    pub fn disabled(config: TranslationConfig) -> Self {
        Self::new(Arc::new(DisabledProvider), config)
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_configured()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn default_lang(&self) -> &str {
        &self.config.default_target_lang
    }

    /// 解析请求中的目标语言，未给出时使用默认语言
    pub fn resolve_lang(&self, lang: Option<&str>) -> TranslationResult<String> {
        match lang.map(str::trim).filter(|lang| !lang.is_empty()) {
            None => Ok(self.config.default_target_lang.clone()),
            Some(lang) if is_valid_lang_code(lang) => Ok(lang.to_string()),
            Some(lang) => Err(TranslationError::InvalidInput(format!(
                "无效的语言代码: {}",
                lang
            ))),
        }
    }

    /// 校验待查询文本，返回去除首尾空白后的文本
    pub fn validate_text<'a>(&self, text: &'a str) -> TranslationResult<&'a str> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslationError::InvalidInput("text 参数不能为空".to_string()));
        }
        let length = text.chars().count();
        if length > constants::MAX_TEXT_LENGTH {
            return Err(TranslationError::InvalidInput(format!(
                "文本过长: {} 字符 (上限 {})",
                length,
                constants::MAX_TEXT_LENGTH
            )));
        }
        Ok(text)
    }

    /// 调用提供者翻译，带超时
    pub async fn try_translate(&self, text: &str, lang: &str) -> TranslationResult<String> {
        timeout(self.config.timeout, self.provider.translate(text, lang)).await?
    }

    /// 查询单词
    ///
    /// 输入无效时返回错误；翻译失败、超时或未配置时返回占位译文并标记 `degraded`。
    pub async fn lookup(&self, text: &str, lang: Option<&str>) -> TranslationResult<WordLookup> {
        let text = self.validate_text(text)?;
        let lang = self.resolve_lang(lang)?;

        let (translation, degraded) = match self.try_translate(text, &lang).await {
            Ok(translation) => (translation, false),
            Err(e) => {
                if self.is_enabled() {
                    warn!("翻译失败，返回占位值: {}", e.with_context(format!("text={}", text)));
                } else {
                    debug!("翻译未启用，返回占位值: {}", text);
                }
                (self.config.placeholder.render(text), true)
            }
        };

        Ok(WordLookup {
            text: text.to_string(),
            lang,
            translation,
            degraded,
        })
    }

    /// 批量翻译多个单词，只返回成功的译文
    ///
    /// 每个批次独立超时，失败的批次被跳过。
    pub async fn translate_many(&self, words: Vec<String>, lang: &str) -> HashMap<String, String> {
        if words.is_empty() || !self.is_enabled() {
            return HashMap::new();
        }

        let batch_size = self.config.batch_size.clamp(1, constants::MAX_BATCH_SIZE);
        let semaphore = Arc::new(Semaphore::new(constants::MAX_CONCURRENT_BATCHES));

        let tasks = words.chunks(batch_size).enumerate().map(|(index, batch)| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                let result = timeout(
                    self.config.timeout,
                    self.provider.translate_batch(batch, lang),
                )
                .await
                .map_err(TranslationError::from)
                .and_then(|result| result);

                match result {
                    Ok(translations) => Some(
                        batch
                            .iter()
                            .cloned()
                            .zip(translations)
                            .filter(|(_, translation)| !translation.trim().is_empty())
                            .collect::<Vec<_>>(),
                    ),
                    Err(e) => {
                        warn!("批次 {} 翻译失败 ({} 项): {}", index + 1, batch.len(), e);
                        None
                    }
                }
            }
        });

        let translations: HashMap<String, String> =
            join_all(tasks).await.into_iter().flatten().flatten().collect();

        debug!("批量翻译完成: {}/{} 项", translations.len(), words.len());
        translations
    }
}
