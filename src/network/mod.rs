//! # 网络模块
//!
//! 远程页面抓取：
//!
//! - `fetcher` - `DocumentFetcher` 抽象、基于 reqwest 的 `HttpFetcher` 以及抓取配置

pub mod fetcher;

// Re-export commonly used items for convenience
pub use fetcher::{DocumentFetcher, FetchConfig, FetchedDocument, HttpFetcher, DEFAULT_USER_AGENT};
