//! 翻译模块
//!
//! - **config**: 凭据、服务地址、默认语言和占位策略
//! - **error**: 统一的错误类型
//! - **provider**: 翻译后端抽象与 Google Cloud Translation 实现
//! - **service**: 输入校验、超时、降级和批量翻译
//! - **tooltips**: 把译文写入单词提示
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use wordtap::translation::{TranslationConfig, TranslationService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = TranslationService::from_config(TranslationConfig::from_env()?);
//! let lookup = service.lookup("cat", Some("ja")).await?;
//! println!("{} -> {}", lookup.text, lookup.translation);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod service;
pub mod tooltips;

pub use config::{constants, GoogleCredentials, PlaceholderPolicy, TranslationConfig};
pub use error::{ErrorCategory, TranslationError, TranslationResult};
pub use provider::{DisabledProvider, GoogleTranslateProvider, TranslationProvider};
pub use service::{TranslationService, WordLookup};
pub use tooltips::{apply_tooltips, collect_word_texts};
