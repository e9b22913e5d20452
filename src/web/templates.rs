//! HTML 模板生成

use crate::parsers::html::inject::{render_interface_markup, InterfaceOptions, READER_CSS, READER_JS};
use crate::utils::escape_html;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const ERROR_TEMPLATE: &str = include_str!("../../templates/error.html");

/// 生成首页：只有底部表单的空白阅读页面
pub fn index_page(lang: &str, font_size_px: u32) -> String {
    let interface = render_interface_markup(&InterfaceOptions {
        page_url: "",
        lang,
        font_size_px,
    });

    INDEX_TEMPLATE
        .replace("{{STYLE}}", READER_CSS)
        .replace("{{SCRIPT}}", READER_JS)
        .replace("{{INTERFACE}}", &interface)
}

/// 生成通用错误页面
pub fn error_page(title: &str, message: &str) -> String {
    ERROR_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{MESSAGE}}", &escape_html(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_contains_form() {
        let html = index_page("ja", 30);
        assert!(html.contains("<form id=\"wordtap-form\" method=\"get\" action=\"/proxy\">"));
        assert!(html.contains("value=\"30\""));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn error_page_escapes_message() {
        let html = error_page("エラーが発生しました", "<b>timeout</b>");
        assert!(html.contains("&lt;b&gt;timeout&lt;/b&gt;"));
    }
}
