//! 阅读界面注入
//!
//! 在代理页面中加入单词样式、底部固定表单（地址输入、字号滑块）以及点击查词脚本。

use markup5ever_rcdom::Handle;

use crate::utils::escape_html;

use super::dom::{
    append_child, create_element, create_text_node, get_body, get_head, get_node_attr,
    html_fragment_to_nodes,
};

/// 界面样式
pub const READER_CSS: &str = include_str!("../../../templates/reader/reader.css");
/// 界面脚本
pub const READER_JS: &str = include_str!("../../../templates/reader/reader.js");
const READER_UI: &str = include_str!("../../../templates/reader/ui.html");

/// 注入界面根元素的 id
pub const UI_ROOT_ID: &str = "wordtap-ui";

/// 注入界面所需的页面信息
#[derive(Debug, Clone, Copy)]
pub struct InterfaceOptions<'a> {
    /// 表单中预填的当前页面地址
    pub page_url: &'a str,
    pub lang: &'a str,
    pub font_size_px: u32,
}

/// 生成界面 HTML 片段（值均已转义）
pub fn render_interface_markup(options: &InterfaceOptions) -> String {
    READER_UI
        .replace("{{PAGE_URL}}", &escape_html(options.page_url))
        .replace("{{LANG}}", &escape_html(options.lang))
        .replace("{{FONT_SIZE}}", &options.font_size_px.to_string())
}

/// 向文档注入阅读界面；已注入过时不做任何事并返回 `false`
pub fn inject_interface(document: &Handle, options: &InterfaceOptions) -> bool {
    if contains_id(document, UI_ROOT_ID) {
        return false;
    }
    let Some(body) = get_body(document) else {
        return false;
    };

    let style = create_element("style", &[("id", "wordtap-style")]);
    append_child(&style, create_text_node(READER_CSS));
    match get_head(document) {
        Some(head) => append_child(&head, style),
        None => append_child(&body, style),
    }

    for node in html_fragment_to_nodes(&render_interface_markup(options)) {
        append_child(&body, node);
    }

    let script = create_element("script", &[("id", "wordtap-script")]);
    append_child(&script, create_text_node(READER_JS));
    append_child(&body, script);

    true
}

fn contains_id(node: &Handle, id: &str) -> bool {
    if get_node_attr(node, "id").as_deref() == Some(id) {
        return true;
    }
    node.children.borrow().iter().any(|child| contains_id(child, id))
}
