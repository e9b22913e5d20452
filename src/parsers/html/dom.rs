use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节按给定编码解码后转换为 DOM
///
/// 编码标签无法识别时按 UTF-8 处理，非法字节替换为 U+FFFD。
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let encoding = Encoding::for_label(document_encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    let (text, _, _) = encoding.decode(data);

    parse_document(RcDom::default(), Default::default()).one(&*text)
}

/// 解析 HTML 片段，返回片段的顶层节点（已脱离临时文档）
pub fn html_fragment_to_nodes(html: &str) -> Vec<Handle> {
    let dom = parse_fragment(
        RcDom::default(),
        Default::default(),
        QualName::new(None, ns!(html), LocalName::from("body")),
        vec![],
    )
    .one(html);

    let Some(root) = get_child_node_by_name(&dom.document, "html") else {
        return Vec::new();
    };

    let nodes: Vec<Handle> = root.children.borrow_mut().drain(..).collect();
    for node in nodes.iter() {
        node.parent.set(None);
    }
    nodes
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    assert!(!node_names.is_empty());

    let mut found_nodes = Vec::new();
    let node_name = node_names[0];

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            found_nodes.append(&mut find_nodes(node, new_node_names));
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 按标签名收集子树中所有元素（包含自身，先序）
pub fn find_elements(node: &Handle, tag: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_elements(node, tag, &mut found);
    found
}

fn collect_elements(node: &Handle, tag: &str, found: &mut Vec<Handle>) {
    if get_node_name(node) == Some(tag) {
        found.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        collect_elements(child, tag, found);
    }
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取文档的 `<body>`，解析器总会补全它
pub fn get_body(document: &Handle) -> Option<Handle> {
    find_nodes(document, vec!["html", "body"]).into_iter().next()
}

/// 获取文档的 `<head>`
pub fn get_head(document: &Handle) -> Option<Handle> {
    find_nodes(document, vec!["html", "head"]).into_iter().next()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点（不改变节点自身的父指针）
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let parent = child.parent.take();
    child.parent.set(parent.clone());
    parent.and_then(|node| node.upgrade())
}

/// 设置节点属性，`None` 表示移除
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 判断元素的 class 列表中是否包含给定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 创建一个游离的 HTML 元素节点
pub fn create_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: StrTendril::from_slice(value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: std::cell::RefCell::new(attrs),
        template_contents: Default::default(),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建一个游离的文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: std::cell::RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 追加子节点并维护父指针
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 在最前面插入子节点并维护父指针
pub fn prepend_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}

/// 将节点从父节点中摘除
pub fn detach_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// 拼接子树中全部文本（用于诊断和测试）
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    push_text(node, &mut text);
    text
}

fn push_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        text.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        push_text(child, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_legacy_encodings() {
        let data = b"<html><body><p>caf\xe9</p></body></html>";
        let dom = html_to_dom(data, "windows-1252");
        let body = get_body(&dom.document).unwrap();
        assert_eq!(text_content(&body), "café");
    }

    #[test]
    fn unknown_encoding_falls_back_to_utf8() {
        let dom = html_to_dom("<p>naïve</p>".as_bytes(), "no-such-charset");
        assert_eq!(text_content(&get_body(&dom.document).unwrap()), "naïve");
    }

    #[test]
    fn parent_lookup_keeps_pointer() {
        let dom = html_to_dom(b"<p>hi</p>", "utf-8");
        let p = find_elements(&dom.document, "p").remove(0);
        assert_eq!(get_node_name(&get_parent_node(&p).unwrap()), Some("body"));
        assert_eq!(get_node_name(&get_parent_node(&p).unwrap()), Some("body"));
    }

    #[test]
    fn set_and_remove_attribute() {
        let node = create_element("a", &[("href", "/x")]);
        set_node_attr(&node, "href", Some("/y".to_string()));
        assert_eq!(get_node_attr(&node, "href").as_deref(), Some("/y"));
        set_node_attr(&node, "href", None);
        assert_eq!(get_node_attr(&node, "href"), None);
    }

    #[test]
    fn class_matching_is_token_based() {
        let node = create_element("span", &[("class", "one wordtap-word two")]);
        assert!(has_class(&node, "wordtap-word"));
        assert!(!has_class(&node, "wordtap"));
    }

    #[test]
    fn fragments_are_detached() {
        let nodes = html_fragment_to_nodes("<div id=\"a\"></div><p>x</p>");
        assert_eq!(nodes.len(), 2);
        assert!(get_parent_node(&nodes[0]).is_none());
        assert_eq!(get_node_attr(&nodes[0], "id").as_deref(), Some("a"));
    }

    #[test]
    fn detach_removes_from_parent() {
        let parent = create_element("div", &[]);
        let child = create_element("span", &[]);
        append_child(&parent, child.clone());
        detach_node(&child);
        assert!(parent.children.borrow().is_empty());
    }
}
