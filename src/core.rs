use std::collections::HashMap;

use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::env::{page, translation as translation_env, EnvResult, EnvVar};
use crate::network::FetchedDocument;
use crate::parsers::css::normalize_font_sizes;
use crate::parsers::html::{
    get_base_url, get_body, get_charset, get_title, html_to_dom, inject_interface,
    remove_base_elements, serialize_document, set_charset, InterfaceOptions, Segmenter, WordRule,
};
use crate::parsers::link_rewriter::{rewrite_links, LinkRewriteOptions};
use crate::translation::tooltips::{apply_tooltips, collect_word_texts};
use crate::utils::resolve_url;

/// Represents errors that can occur while proxying a page
#[derive(Error, Debug)]
pub enum WordtapError {
    /// The requested target is missing or is not an http(s) URL
    #[error("invalid target URL: {0}")]
    InvalidUrl(String),

    /// The remote page could not be retrieved (network error, timeout, non-2xx)
    #[error("failed to fetch document: {0}")]
    Fetch(String),

    /// The remote resource is not an HTML document
    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// The fetched markup could not be turned into a usable document tree
    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("failed to serialize document: {0}")]
    Serialize(String),

    #[error("server error: {0}")]
    Server(String),
}

impl WordtapError {
    /// Errors caused by the request itself rather than by the remote site or the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, WordtapError::InvalidUrl(_))
    }
}

/// Media types that are rendered through the proxy
const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Parses a Content-Type header value into its media type and optional charset
pub fn parse_content_type(content_type: &str) -> (String, Option<String>) {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_lowercase();

    let charset = parts
        .map(str::trim)
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .filter(|charset| !charset.is_empty());

    (media_type, charset)
}

/// Checks if the given media type can be rendered as an HTML page
///
/// A missing media type is accepted and treated as HTML.
pub fn is_html_media_type(media_type: &str) -> bool {
    media_type.is_empty() || HTML_MEDIA_TYPES.contains(&media_type)
}

/// Options that control how a proxied page is rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// Language used when a request does not name one
    pub default_lang: String,
    /// Font size forced onto the page and used as the slider's initial value
    pub font_size_px: u32,
    /// Shortest run of letters that is wrapped as a word
    pub min_word_length: usize,
    /// Route in-page links back through the proxy
    pub rewrite_links: bool,
    /// Fill each word's `title` attribute with its translation while rendering
    pub prefetch_tooltips: bool,
    /// Maximum number of distinct words translated for tooltips
    pub prefetch_limit: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            default_lang: crate::translation::config::constants::DEFAULT_TARGET_LANG.to_string(),
            font_size_px: 30,
            min_word_length: 1,
            rewrite_links: true,
            prefetch_tooltips: false,
            prefetch_limit: 300,
        }
    }
}

impl PageOptions {
    /// Loads page options from environment variables
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            default_lang: translation_env::TargetLang::get()?,
            font_size_px: page::FontSize::get()?,
            min_word_length: page::MinWordLength::get()?,
            rewrite_links: page::RewriteLinks::get()?,
            prefetch_tooltips: page::PrefetchTooltips::get()?,
            prefetch_limit: page::PrefetchLimit::get()?,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if !crate::utils::is_valid_lang_code(&self.default_lang) {
            return Err(format!("invalid default language '{}'", self.default_lang));
        }
        if !(10..=60).contains(&self.font_size_px) {
            return Err(format!("font size {}px is outside 10-60", self.font_size_px));
        }
        if self.min_word_length == 0 {
            return Err("minimum word length must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Summary of one rendered page
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    pub html: String,
    pub title: Option<String>,
    pub words: usize,
    pub tooltips: usize,
}

/// Looks up translations for a list of distinct words; missing keys mean "no tooltip"
pub type TooltipSource<'a> = &'a dyn Fn(Vec<String>) -> HashMap<String, String>;

/// Turns a fetched document into the interactive reading page
///
/// Steps: decode and parse, segment `<body>`, normalize font sizes, rewrite links,
/// optionally pre-fill tooltips, inject the reader interface, serialize as UTF-8.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    options: PageOptions,
    segmenter: Segmenter,
}

impl DocumentProcessor {
    pub fn new(options: PageOptions) -> Self {
        let rule = WordRule::default().with_min_length(options.min_word_length);
        Self {
            options,
            segmenter: Segmenter::new(rule),
        }
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Decodes and parses the document
    ///
    /// The Content-Type charset wins; otherwise a charset declared by the document
    /// itself is honored; UTF-8 is the fallback.
    pub fn parse(&self, document: &FetchedDocument) -> RcDom {
        let header_encoding = document
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label_no_replacement(label.as_bytes()));

        if let Some(encoding) = header_encoding {
            return html_to_dom(&document.data, encoding.name());
        }

        let dom = html_to_dom(&document.data, "utf-8");
        match get_charset(&dom.document)
            .and_then(|label| Encoding::for_label_no_replacement(label.as_bytes()))
        {
            Some(encoding) if encoding != encoding_rs::UTF_8 => {
                debug!("按文档声明的编码重新解析: {}", encoding.name());
                html_to_dom(&document.data, encoding.name())
            }
            _ => dom,
        }
    }

    /// Runs the whole pipeline for one page
    pub fn process_page(
        &self,
        document: &FetchedDocument,
        lang: &str,
        tooltip_source: Option<TooltipSource<'_>>,
    ) -> Result<ProcessedPage, WordtapError> {
        let dom = self.parse(document);

        let base_url = get_base_url(&dom.document)
            .and_then(|href| resolve_url(&document.url, &href))
            .unwrap_or_else(|| document.url.clone());
        remove_base_elements(&dom.document);

        let body = get_body(&dom.document)
            .ok_or_else(|| WordtapError::Parse("document has no body".to_string()))?;

        let stats = self.segmenter.segment(&body);
        let restyled = normalize_font_sizes(&dom.document, self.options.font_size_px);
        let rewritten = rewrite_links(
            &dom.document,
            &base_url,
            &LinkRewriteOptions {
                proxy_navigation: self.options.rewrite_links,
                lang,
            },
        );

        let mut tooltips = 0;
        if self.options.prefetch_tooltips {
            if let Some(source) = tooltip_source {
                let wrappers = self.segmenter.wrappers(&body);
                let words = collect_word_texts(&wrappers, self.options.prefetch_limit);
                if !words.is_empty() {
                    let translations = source(words);
                    tooltips = apply_tooltips(&wrappers, &translations);
                }
            }
        }

        set_charset(&dom.document, "utf-8");
        inject_interface(
            &dom.document,
            &InterfaceOptions {
                page_url: document.url.as_str(),
                lang,
                font_size_px: self.options.font_size_px,
            },
        );

        let title = get_title(&dom.document);
        let html = serialize_document(&dom)?;

        info!(
            "页面处理完成: {} (单词 {}, 字号改写 {}, 链接改写 {}, 提示 {})",
            document.url, stats.words, restyled, rewritten, tooltips
        );

        Ok(ProcessedPage {
            html,
            title,
            words: stats.words,
            tooltips,
        })
    }
}

/// Convenience wrapper that renders raw markup without tooltips
pub fn render_markup(
    markup: &str,
    page_url: &Url,
    lang: &str,
    options: PageOptions,
) -> Result<ProcessedPage, WordtapError> {
    let document = FetchedDocument {
        url: page_url.clone(),
        data: markup.as_bytes().to_vec(),
        media_type: "text/html".to_string(),
        charset: Some("utf-8".to_string()),
    };
    DocumentProcessor::new(options).process_page(&document, lang, None)
}
