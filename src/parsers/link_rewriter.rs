//! 链接重写模块
//!
//! 页面内的导航链接改写为经由本服务打开的代理链接，
//! 图片、脚本、样式表等资源引用补全为指向原站的绝对地址。

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{get_node_attr, set_node_attr};
use crate::utils::url::{is_http_url, proxy_url, resolve_url, Url};

/// 链接重写选项
#[derive(Debug, Clone, Copy)]
pub struct LinkRewriteOptions<'a> {
    /// 是否把 `<a>`/`<area>` 改写为代理链接；否则只补全为绝对地址
    pub proxy_navigation: bool,
    /// 代理链接携带的目标语言
    pub lang: &'a str,
}

/// 资源属性：(元素名, 属性名)
const RESOURCE_ATTRIBUTES: &[(&str, &str)] = &[
    ("img", "src"),
    ("script", "src"),
    ("iframe", "src"),
    ("embed", "src"),
    ("source", "src"),
    ("video", "src"),
    ("video", "poster"),
    ("audio", "src"),
    ("track", "src"),
    ("input", "src"),
    ("link", "href"),
    ("object", "data"),
    // GET 表单提交会丢弃 action 中的查询串，因此表单只补全为绝对地址
    ("form", "action"),
];

/// 重写文档中的链接，返回改写的属性数
pub fn rewrite_links(document: &Handle, base_url: &Url, options: &LinkRewriteOptions) -> usize {
    let mut rewritten = 0;
    walk_and_rewrite_links(document, base_url, options, &mut rewritten);
    rewritten
}

/// 递归遍历DOM树并重写链接
fn walk_and_rewrite_links(
    node: &Handle,
    base_url: &Url,
    options: &LinkRewriteOptions,
    rewritten: &mut usize,
) {
    if let NodeData::Element { ref name, .. } = node.data {
        let tag = name.local.as_ref();

        if tag == "a" || tag == "area" {
            *rewritten += rewrite_anchor_link(node, base_url, options) as usize;
        }

        for (element, attribute) in RESOURCE_ATTRIBUTES {
            if *element == tag {
                *rewritten += absolutize_attribute(node, attribute, base_url) as usize;
            }
        }

        if tag == "img" || tag == "source" {
            *rewritten += absolutize_srcset(node, base_url) as usize;
        }
    }

    for child_node in node.children.borrow().iter() {
        walk_and_rewrite_links(child_node, base_url, options, rewritten);
    }
}

/// 重写锚点链接的href属性
fn rewrite_anchor_link(node: &Handle, base_url: &Url, options: &LinkRewriteOptions) -> bool {
    let Some(href_value) = get_node_attr(node, "href") else {
        return false;
    };
    let trimmed_href = href_value.trim();

    if should_skip_link(trimmed_href) {
        return false;
    }

    let Some(absolute_url) = resolve_url(base_url, trimmed_href) else {
        return false;
    };
    if !is_http_url(&absolute_url) {
        return false;
    }

    let new_href = if options.proxy_navigation {
        proxy_url(&absolute_url, options.lang)
    } else {
        absolute_url.to_string()
    };
    set_node_attr(node, "href", Some(new_href));
    true
}

/// 把资源属性补全为绝对地址
fn absolutize_attribute(node: &Handle, attribute: &str, base_url: &Url) -> bool {
    let Some(value) = get_node_attr(node, attribute) else {
        return false;
    };
    let trimmed = value.trim();

    if should_skip_link(trimmed) {
        return false;
    }

    match resolve_url(base_url, trimmed) {
        Some(absolute_url) if absolute_url.as_str() != value => {
            set_node_attr(node, attribute, Some(absolute_url.to_string()));
            true
        }
        _ => false,
    }
}

/// 补全 srcset 中每个候选地址，保留描述符
fn absolutize_srcset(node: &Handle, base_url: &Url) -> bool {
    let Some(srcset) = get_node_attr(node, "srcset") else {
        return false;
    };
    // data: URL 内含逗号，无法按逗号拆分
    if srcset.contains("data:") || srcset.trim().is_empty() {
        return false;
    }

    let candidates: Vec<String> = srcset
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| {
            let (path, descriptor) = candidate
                .split_once(char::is_whitespace)
                .map(|(p, d)| (p, d.trim()))
                .unwrap_or((candidate, ""));
            let path = resolve_url(base_url, path)
                .map(|url| url.to_string())
                .unwrap_or_else(|| path.to_string());
            if descriptor.is_empty() {
                path
            } else {
                format!("{} {}", path, descriptor)
            }
        })
        .collect();

    set_node_attr(node, "srcset", Some(candidates.join(", ")));
    true
}

/// 判断是否应该跳过重写的链接
fn should_skip_link(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
        || lower.starts_with("blob:")
}
