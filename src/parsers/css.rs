//! CSS 字号统一
//!
//! 把行内 `style` 属性和 `<style>` 元素里所有以像素为单位的 `font-size`
//! 声明改写为统一字号，方便在阅读时整体调整文字大小。

use std::borrow::Cow;
use std::sync::OnceLock;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use crate::parsers::html::{get_node_attr, get_node_name, set_node_attr};

static FONT_SIZE_REGEX: OnceLock<Regex> = OnceLock::new();

fn font_size_regex() -> &'static Regex {
    FONT_SIZE_REGEX.get_or_init(|| {
        Regex::new(r"(?i)font-size\s*:\s*\d+(?:\.\d+)?px").expect("font-size pattern is valid")
    })
}

/// 改写一段 CSS 中的像素字号，返回改写后的文本和改写次数
pub fn rewrite_font_sizes(css: &str, size_px: u32) -> (Cow<'_, str>, usize) {
    let regex = font_size_regex();
    let count = regex.find_iter(css).count();
    if count == 0 {
        return (Cow::Borrowed(css), 0);
    }

    let replacement = format!("font-size:{}px", size_px);
    (regex.replace_all(css, replacement.as_str()), count)
}

/// 遍历 DOM，统一所有像素字号，返回改写的声明数
pub fn normalize_font_sizes(node: &Handle, size_px: u32) -> usize {
    let mut rewritten = 0;

    if let NodeData::Element { .. } = node.data {
        if let Some(style) = get_node_attr(node, "style") {
            let (css, count) = rewrite_font_sizes(&style, size_px);
            if count > 0 {
                set_node_attr(node, "style", Some(css.into_owned()));
                rewritten += count;
            }
        }

        if get_node_name(node) == Some("style") {
            for child in node.children.borrow().iter() {
                if let NodeData::Text { ref contents } = child.data {
                    let original = contents.borrow().to_string();
                    let (css, count) = rewrite_font_sizes(&original, size_px);
                    if count > 0 {
                        let mut contents = contents.borrow_mut();
                        contents.clear();
                        contents.push_slice(&css);
                        rewritten += count;
                    }
                }
            }
        }
    }

    for child in node.children.borrow().iter() {
        rewritten += normalize_font_sizes(child, size_px);
    }

    rewritten
}
