//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、单词切分、界面注入
//! - `css` - 像素字号统一
//! - `link_rewriter` - 链接重写，把导航留在代理内

pub mod css;
pub mod html;
pub mod link_rewriter;

// Re-export commonly used items for convenience
pub use css::normalize_font_sizes;
pub use html::{
    get_title, html_to_dom, segment_text, serialize_document, Fragment, SegmentStats, Segmenter,
    WordRule,
};
pub use link_rewriter::{rewrite_links, LinkRewriteOptions};
