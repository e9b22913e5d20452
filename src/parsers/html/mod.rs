//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `segmenter`: 单词切分与包装
//! - `metadata`: 文档元数据处理
//! - `inject`: 阅读界面注入
//! - `serializer`: 序列化功能

pub mod dom;
pub mod inject;
pub mod metadata;
pub mod segmenter;
pub mod serializer;

pub use dom::{
    append_child, create_element, create_text_node, find_elements, find_nodes, get_body,
    get_child_node_by_name, get_head, get_node_attr, get_node_name, get_parent_node, has_class,
    html_fragment_to_nodes, html_to_dom, set_node_attr, text_content,
};
pub use inject::{inject_interface, InterfaceOptions};
pub use metadata::{get_base_url, get_charset, get_title, remove_base_elements, set_charset};
pub use segmenter::{segment_text, Fragment, SegmentStats, Segmenter, WordRule, WORD_CLASS};
pub use serializer::{serialize_document, serialize_node};
