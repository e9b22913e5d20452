//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 未配置凭据，翻译功能在进程生命周期内处于关闭状态
    #[error("翻译未配置: {0}")]
    ConfigurationMissing(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 翻译服务返回了错误（凭据无效、配额用尽等）
    #[error("翻译服务错误 ({status}): {message}")]
    ProviderError { status: u16, message: String },

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 翻译服务响应无法解析
    #[error("响应解析错误: {0}")]
    ResponseError(String),
}

impl TranslationError {
    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigurationMissing(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::TimeoutError(_) => ErrorCategory::Timeout,
            TranslationError::ProviderError { .. } => ErrorCategory::Service,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::ResponseError(_) => ErrorCategory::Parsing,
        }
    }

    /// 请求本身有误（而非翻译服务不可用）
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Input
    }

    /// 查词时可以降级为占位值的错误
    pub fn is_degradable(&self) -> bool {
        !self.is_client_error()
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let append = |msg: String| format!("{} (上下文: {})", msg, context);
        match self {
            TranslationError::ConfigurationMissing(msg) => {
                TranslationError::ConfigurationMissing(append(msg))
            }
            TranslationError::NetworkError(msg) => TranslationError::NetworkError(append(msg)),
            TranslationError::TimeoutError(msg) => TranslationError::TimeoutError(append(msg)),
            TranslationError::ProviderError { status, message } => TranslationError::ProviderError {
                status,
                message: append(message),
            },
            TranslationError::InvalidInput(msg) => TranslationError::InvalidInput(append(msg)),
            TranslationError::ResponseError(msg) => TranslationError::ResponseError(append(msg)),
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Timeout,
    Service,
    Input,
    Parsing,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::TimeoutError(error.to_string())
        } else if error.is_decode() {
            TranslationError::ResponseError(error.to_string())
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::ResponseError(format!("JSON解析错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
