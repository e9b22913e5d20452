// 集成测试公共模块
//
// 提供测试替身（翻译提供者、文档抓取器）和共享辅助函数

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use url::Url;

use wordtap::core::WordtapError;
use wordtap::network::{DocumentFetcher, FetchedDocument};
use wordtap::translation::{TranslationError, TranslationProvider, TranslationResult};

/// 模拟翻译提供者的行为
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// 按词典翻译，词典中没有的词返回 `<text>-tr`
    Working(HashMap<String, String>),
    /// 每次调用都返回给定错误
    Failing(TranslationError),
    /// 睡眠给定时间后再翻译
    Slow(Duration),
}

/// 模拟翻译提供者
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn working() -> Self {
        Self::with_dictionary(&[("cat", "猫"), ("dog", "犬")])
    }

    pub fn with_dictionary(entries: &[(&str, &str)]) -> Self {
        let dictionary = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(MockBehavior::Working(dictionary))
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing(TranslationError::ProviderError {
            status: 403,
            message: "The request is missing a valid API key.".to_string(),
        }))
    }

    pub fn slow(delay: Duration) -> Self {
        Self::new(MockBehavior::Slow(delay))
    }

    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn translate(&self, text: &str, _target_lang: &str) -> TranslationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Working(dictionary) => Ok(dictionary
                .get(text)
                .cloned()
                .unwrap_or_else(|| format!("{}-tr", text))),
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(format!("{}-tr", text))
            }
        }
    }
}

/// 返回预先准备好的页面的抓取器
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, (String, Vec<u8>)>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 `text/html; charset=utf-8` 注册页面
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_response(url, "text/html; charset=utf-8", html.as_bytes())
    }

    pub fn with_response(mut self, url: &str, content_type: &str, body: &[u8]) -> Self {
        self.pages
            .insert(url.to_string(), (content_type.to_string(), body.to_vec()));
        self
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, WordtapError> {
        let (content_type, body) = self
            .pages
            .get(url.as_str())
            .ok_or_else(|| WordtapError::Fetch(format!("{} returned HTTP 404 Not Found", url)))?;

        let (media_type, charset) = wordtap::core::parse_content_type(content_type);
        if !wordtap::core::is_html_media_type(&media_type) {
            return Err(WordtapError::UnsupportedMedia(media_type));
        }

        Ok(FetchedDocument {
            url: url.clone(),
            data: body.clone(),
            media_type,
            charset,
        })
    }
}

/// HTML 测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 创建测试用DOM
    pub fn create_test_dom(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    /// 按文档顺序列出所有元素名
    pub fn element_names(node: &Handle) -> Vec<String> {
        let mut names = Vec::new();
        Self::collect_element_names(node, &mut names);
        names
    }

    fn collect_element_names(node: &Handle, names: &mut Vec<String>) {
        if let NodeData::Element { ref name, .. } = node.data {
            names.push(name.local.to_string());
        }
        for child in node.children.borrow().iter() {
            Self::collect_element_names(child, names);
        }
    }

    /// 拼接所有文本节点
    pub fn all_text(node: &Handle) -> String {
        let mut text = String::new();
        Self::collect_text(node, &mut text);
        text
    }

    fn collect_text(node: &Handle, text: &mut String) {
        if let NodeData::Text { ref contents } = node.data {
            text.push_str(&contents.borrow());
        }
        for child in node.children.borrow().iter() {
            Self::collect_text(child, text);
        }
    }
}

/// 构建测试用应用状态
#[cfg(feature = "web")]
pub fn test_state(
    fetcher: StaticFetcher,
    provider: Arc<dyn TranslationProvider>,
    page_options: wordtap::core::PageOptions,
) -> Arc<wordtap::web::AppState> {
    use wordtap::translation::{TranslationConfig, TranslationService};

    let config = TranslationConfig {
        timeout: Duration::from_millis(200),
        ..TranslationConfig::default()
    };
    Arc::new(wordtap::web::AppState::new(
        Arc::new(fetcher),
        TranslationService::new(provider, config),
        page_options,
        "development",
    ))
}

/// 在本地随机端口启动路由器，返回 `http://127.0.0.1:<port>`
#[cfg(feature = "web")]
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}
