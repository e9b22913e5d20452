use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

use crate::core::WordtapError;

/// 将整个文档序列化为 UTF-8 HTML
pub fn serialize_document(dom: &RcDom) -> Result<String, WordtapError> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = dom.document.clone().into();

    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| WordtapError::Serialize(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| WordtapError::Serialize(e.to_string()))
}

/// 序列化单个节点（包含节点自身），失败时返回空字符串
pub fn serialize_node(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    if serialize(&mut buf, &serializable, opts).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_elements, html_to_dom};

    #[test]
    fn serializes_whole_document() {
        let dom = html_to_dom(b"<p>hi</p>", "utf-8");
        let html = serialize_document(&dom).unwrap();
        assert_eq!(html, "<html><head></head><body><p>hi</p></body></html>");
    }

    #[test]
    fn serializes_single_node() {
        let dom = html_to_dom(b"<p class=\"a\">x &amp; y</p>", "utf-8");
        let p = find_elements(&dom.document, "p").remove(0);
        assert_eq!(serialize_node(&p), "<p class=\"a\">x &amp; y</p>");
    }

    #[test]
    fn script_text_is_not_escaped() {
        let dom = html_to_dom(b"<script>if (a < b) {}</script>", "utf-8");
        let html = serialize_document(&dom).unwrap();
        assert!(html.contains("<script>if (a < b) {}</script>"));
    }
}
