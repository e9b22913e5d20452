//! 远程文档抓取

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::core::{is_html_media_type, parse_content_type, WordtapError};
use crate::env::{fetch, EnvResult, EnvVar};
use crate::utils::clean_url;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// 抓取到的文档
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// 最终地址（跟随重定向之后）
    pub url: Url,
    pub data: Vec<u8>,
    pub media_type: String,
    /// Content-Type 中声明的字符集
    pub charset: Option<String>,
}

/// 文档抓取器
///
/// Web 层通过这个接口获取页面，测试中可以替换为静态实现。
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, WordtapError>;
}

/// 抓取配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_document_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_document_bytes: 5 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            timeout: fetch::Timeout::get()?,
            user_agent: fetch::UserAgent::get()?,
            max_document_bytes: fetch::MaxDocumentBytes::get()?,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeout.is_zero() {
            return Err("fetch timeout must be greater than 0".to_string());
        }
        if self.max_document_bytes == 0 {
            return Err("maximum document size must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// 基于 reqwest 的抓取器
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, WordtapError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| WordtapError::Server(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, WordtapError> {
        let request_url = clean_url(url.clone());
        debug!("抓取页面: {}", request_url);

        let mut response = self
            .client
            .get(request_url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5")
            .send()
            .await
            .map_err(|e| describe_request_error(&request_url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("远程页面返回错误状态: {} {}", request_url, status);
            return Err(WordtapError::Fetch(format!("{} returned HTTP {}", request_url, status)));
        }

        let final_url = response.url().clone();
        let (media_type, charset) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(parse_content_type)
            .unwrap_or_default();

        if !is_html_media_type(&media_type) {
            return Err(WordtapError::UnsupportedMedia(media_type));
        }

        let limit = self.config.max_document_bytes;
        if response
            .content_length()
            .is_some_and(|length| exceeds_limit(length, limit))
        {
            return Err(WordtapError::Fetch(format!(
                "{} is larger than {} bytes",
                request_url, limit
            )));
        }

        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| describe_request_error(&request_url, e))?
        {
            if data.len() + chunk.len() > limit {
                return Err(WordtapError::Fetch(format!(
                    "{} is larger than {} bytes",
                    request_url, limit
                )));
            }
            data.extend_from_slice(&chunk);
        }

        debug!("页面抓取完成: {} ({} 字节)", final_url, data.len());

        Ok(FetchedDocument {
            url: final_url,
            data,
            media_type,
            charset,
        })
    }
}

/// 声明的长度超出上限；无法放进 usize 的长度一律视为超出
fn exceeds_limit(length: u64, limit: usize) -> bool {
    usize::try_from(length).map_or(true, |length| length > limit)
}

fn describe_request_error(url: &Url, error: reqwest::Error) -> WordtapError {
    if error.is_timeout() {
        WordtapError::Fetch(format!("timed out fetching {}", url))
    } else if error.is_connect() {
        WordtapError::Fetch(format!("could not connect to {}", url))
    } else {
        WordtapError::Fetch(format!("{}: {}", url, error))
    }
}
