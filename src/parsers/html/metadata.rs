//! HTML 文档元数据处理模块
//!
//! 读取标题、字符编码声明和 `<base>` 地址，并在输出前把字符编码声明统一为 UTF-8。

use markup5ever_rcdom::{Handle, NodeData};

use crate::core::parse_content_type;

use super::dom::{create_element, detach_node, find_nodes, get_head, get_node_attr, prepend_child, set_node_attr};

/// 获取文档的 base URL
///
/// 只有第一个 `<base>` 标签有效，其余的将被忽略。
pub fn get_base_url(handle: &Handle) -> Option<String> {
    find_nodes(handle, vec!["html", "head", "base"])
        .first()
        .and_then(|base_node| get_node_attr(base_node, "href"))
        .filter(|href| !href.trim().is_empty())
}

/// 移除所有 `<base>` 元素，返回移除的数量
///
/// 代理输出中的相对地址都指向本服务，保留原页面的 base 会把它们解析到原站。
pub fn remove_base_elements(handle: &Handle) -> usize {
    let base_nodes = find_nodes(handle, vec!["html", "head", "base"]);
    for base_node in base_nodes.iter() {
        detach_node(base_node);
    }
    base_nodes.len()
}

/// 获取文档字符编码
///
/// 支持 `<meta charset="...">` 与 `<meta http-equiv="content-type" content="...">` 两种写法。
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, vec!["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            return Some(meta_charset_node_attr_value.trim().to_string());
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                let (_media_type, charset) = parse_content_type(&content);
                return charset;
            }
        }
    }

    None
}

/// 把文档中的字符编码声明改为 `charset`，没有声明时在 `<head>` 开头插入一个
pub fn set_charset(document: &Handle, charset: &str) {
    for meta_node in find_nodes(document, vec!["html", "head", "meta"]).iter() {
        if get_node_attr(meta_node, "charset").is_some() {
            set_node_attr(meta_node, "charset", Some(charset.to_string()));
            return;
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
            && get_node_attr(meta_node, "content").is_some()
        {
            set_node_attr(
                meta_node,
                "content",
                Some(format!("text/html;charset={charset}")),
            );
            return;
        }
    }

    if let Some(head_node) = get_head(document) {
        prepend_child(&head_node, create_element("meta", &[("charset", charset)]));
    }
}

/// 获取文档标题
pub fn get_title(node: &Handle) -> Option<String> {
    for title_node in find_nodes(node, vec!["html", "head", "title"]).iter() {
        for child_node in title_node.children.borrow().iter() {
            if let NodeData::Text { ref contents } = child_node.data {
                let title = contents.borrow().trim().to_string();
                if !title.is_empty() {
                    return Some(title);
                }
            }
        }
    }

    None
}
