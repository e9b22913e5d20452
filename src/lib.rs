//! # Wordtap Library
//!
//! 一个阅读代理：抓取任意网页，把正文中的每个单词包装成可点击的元素，
//! 并通过云端翻译 API 提供逐词翻译。
//!
//! ## 模块组织
//!
//! - `core` - 核心错误类型、页面选项和页面处理流程
//! - `env` - 类型安全的环境变量
//! - `network` - 远程文档抓取
//! - `parsers` - HTML 解析、分词包装、样式与链接改写
//! - `translation` - 翻译服务与提供方
//! - `utils` - 工具函数和实用程序
//! - `web` - Web服务器功能（可选）

pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod translation;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use crate::core::{
    render_markup, DocumentProcessor, PageOptions, ProcessedPage, TooltipSource, WordtapError,
};
pub use crate::network::{DocumentFetcher, FetchConfig, FetchedDocument, HttpFetcher};
pub use crate::parsers::html::{Segmenter, WordRule, WORD_CLASS};
pub use crate::translation::{TranslationConfig, TranslationService, WordLookup};
