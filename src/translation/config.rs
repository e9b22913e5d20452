//! 翻译配置管理模块
//!
//! 凭据、服务地址、默认语言、超时和占位策略，全部来自环境变量。

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env::{translation as translation_env, EnvResult, EnvVar};
use crate::translation::error::{TranslationError, TranslationResult};

/// 配置常量
pub mod constants {
    /// Google Cloud Translation v2 接口
    pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";
    pub const DEFAULT_TARGET_LANG: &str = "ja";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

    /// v2 接口单次请求允许的最大 `q` 数量
    pub const MAX_BATCH_SIZE: usize = 128;
    /// 同时进行的批量请求数
    pub const MAX_CONCURRENT_BATCHES: usize = 4;

    /// 查词接口接受的最大字符数
    pub const MAX_TEXT_LENGTH: usize = 200;

    /// 翻译不可用时显示的标记
    pub const UNAVAILABLE_MARKER: &str = "[翻訳できません]";
}

/// 翻译失败时的占位策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderPolicy {
    /// 返回原文
    Original,
    /// 返回空字符串
    Empty,
    /// 返回固定标记
    #[default]
    Marker,
}

impl PlaceholderPolicy {
    pub fn render(&self, text: &str) -> String {
        match self {
            PlaceholderPolicy::Original => text.to_string(),
            PlaceholderPolicy::Empty => String::new(),
            PlaceholderPolicy::Marker => constants::UNAVAILABLE_MARKER.to_string(),
        }
    }
}

impl FromStr for PlaceholderPolicy {
    type Err = TranslationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "original" => Ok(PlaceholderPolicy::Original),
            "empty" => Ok(PlaceholderPolicy::Empty),
            "marker" => Ok(PlaceholderPolicy::Marker),
            other => Err(TranslationError::InvalidInput(format!(
                "未知的占位策略: {}",
                other
            ))),
        }
    }
}

/// `GOOGLE_CREDENTIALS` 中可识别的字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleCredentials {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub key: Option<String>,
    pub client_email: Option<String>,
}

impl GoogleCredentials {
    pub fn parse(json: &str) -> TranslationResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            TranslationError::ConfigurationMissing(format!("GOOGLE_CREDENTIALS 不是有效的 JSON: {}", e))
        })
    }

    /// 可直接用于 v2 接口的 API 密钥
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .or(self.key.as_deref())
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn is_service_account(&self) -> bool {
        self.kind.as_deref() == Some("service_account")
    }
}

/// 翻译配置
#[derive(Clone)]
pub struct TranslationConfig {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub endpoint: String,
    pub default_target_lang: String,
    pub source_lang: Option<String>,
    pub timeout: Duration,
    pub placeholder: PlaceholderPolicy,
    pub batch_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            endpoint: constants::DEFAULT_ENDPOINT.to_string(),
            default_target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            source_lang: None,
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            placeholder: PlaceholderPolicy::default(),
            batch_size: constants::MAX_BATCH_SIZE,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[configured]"))
            .field("project_id", &self.project_id)
            .field("endpoint", &self.endpoint)
            .field("default_target_lang", &self.default_target_lang)
            .field("source_lang", &self.source_lang)
            .field("timeout", &self.timeout)
            .field("placeholder", &self.placeholder)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl TranslationConfig {
    /// 从环境变量加载配置
    ///
    /// `GOOGLE_TRANSLATE_API_KEY` 优先；否则从 `GOOGLE_CREDENTIALS` JSON 中读取密钥。
    /// 凭据缺失或无法解析时不报错，只是让翻译处于关闭状态。
    pub fn from_env() -> EnvResult<Self> {
        let mut config = Self {
            endpoint: translation_env::Endpoint::get()?,
            default_target_lang: translation_env::TargetLang::get()?,
            source_lang: translation_env::SourceLang::get().ok(),
            timeout: translation_env::Timeout::get()?,
            placeholder: translation_env::Placeholder::get()?
                .parse()
                .unwrap_or_default(),
            ..Self::default()
        };

        if let Ok(json) = translation_env::Credentials::get() {
            config.apply_credentials(&json);
        }
        if let Ok(key) = translation_env::ApiKey::get() {
            config.api_key = Some(key);
        }

        Ok(config)
    }

    /// 读取凭据 JSON 中的密钥和项目 ID
    pub fn apply_credentials(&mut self, json: &str) {
        match GoogleCredentials::parse(json) {
            Ok(credentials) => {
                self.project_id = credentials.project_id.clone();
                match credentials.api_key() {
                    Some(key) => self.api_key = Some(key.to_string()),
                    None if credentials.is_service_account() => tracing::warn!(
                        "GOOGLE_CREDENTIALS 是服务账号凭据 ({})，但未包含 api_key，翻译将保持关闭",
                        credentials.client_email.as_deref().unwrap_or("unknown")
                    ),
                    None => tracing::warn!("GOOGLE_CREDENTIALS 中没有 api_key 字段"),
                }
            }
            Err(e) => tracing::error!("{}", e),
        }
    }

    /// 是否具备调用翻译服务所需的凭据
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(TranslationError::InvalidInput(format!(
                "翻译服务地址无效: {}",
                self.endpoint
            )));
        }
        if !crate::utils::is_valid_lang_code(&self.default_target_lang) {
            return Err(TranslationError::InvalidInput(format!(
                "默认目标语言无效: {}",
                self.default_target_lang
            )));
        }
        if self.timeout.is_zero() {
            return Err(TranslationError::InvalidInput("翻译超时必须大于 0".to_string()));
        }
        if self.batch_size == 0 || self.batch_size > constants::MAX_BATCH_SIZE {
            return Err(TranslationError::InvalidInput(format!(
                "批次大小必须在 1 到 {} 之间",
                constants::MAX_BATCH_SIZE
            )));
        }
        Ok(())
    }

    /// 要求凭据存在，用于启动时快速失败
    pub fn require_credentials(&self) -> TranslationResult<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(TranslationError::ConfigurationMissing(
                "未设置 GOOGLE_TRANSLATE_API_KEY，GOOGLE_CREDENTIALS 中也没有 api_key".to_string(),
            ))
        }
    }
}
