//! 单词切分与包装
//!
//! 深度优先（先序）遍历 DOM，把文本节点切成“单词 / 非单词”片段，
//! 单词片段包进带标记类名的 `<span>`，其余片段保留为原样文本。
//! 元素节点及其属性不会被修改，只替换文本子节点。

use std::ops::Range;
use std::rc::Rc;
use std::sync::OnceLock;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use super::dom::{
    append_child, create_element, create_text_node, get_node_attr, get_node_name,
    get_parent_node, has_class,
};

/// 单词包装元素使用的类名
pub const WORD_CLASS: &str = "wordtap-word";

/// 带有此属性的元素整棵子树都不切分
pub const SKIP_ATTRIBUTE: &str = "data-wordtap-skip";

/// 连续字母，允许内部用撇号连接（don't、rock'n'roll、O’Neil）
///
/// 字母后的组合附加符号属于同一个词，分解形式的 "cafe\u{301}" 不会被拆开。
pub const WORD_PATTERN: &str =
    r"\p{Alphabetic}[\p{Alphabetic}\p{M}]*(?:['’]\p{Alphabetic}[\p{Alphabetic}\p{M}]*)*";

/// 不参与切分的元素：脚本、样式以及不渲染为正文的容器
pub const EXCLUDED_ELEMENTS: [&str; 14] = [
    "script", "style", "noscript", "template", "head", "title", "textarea", "option", "select",
    "svg", "math", "iframe", "object", "canvas",
];

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| Regex::new(WORD_PATTERN).expect("word pattern is a valid regex"))
}

/// 文本片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub is_word: bool,
}

impl Fragment {
    pub fn word(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_word: true,
        }
    }

    pub fn gap(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_word: false,
        }
    }
}

/// 单词匹配规则
#[derive(Debug, Clone)]
pub struct WordRule {
    pattern: Regex,
    min_length: usize,
}

impl Default for WordRule {
    fn default() -> Self {
        Self {
            pattern: word_regex().clone(),
            min_length: 1,
        }
    }
}

impl WordRule {
    /// 使用自定义正则创建规则
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            min_length: 1,
        })
    }

    /// 设置最短单词长度（按字符计，至少为 1）
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length.max(1);
        self
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// 返回文本中所有被视为单词的字节区间
    ///
    /// 空匹配和短于最短长度的匹配会被跳过，它们的字符并入相邻的非单词片段。
    pub fn word_ranges<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        self.pattern
            .find_iter(text)
            .filter(move |m| !m.is_empty() && m.as_str().chars().count() >= self.min_length)
            .map(|m| m.range())
    }

    /// 整段文本是否恰好是一个单词
    pub fn is_word(&self, text: &str) -> bool {
        let mut ranges = self.word_ranges(text);
        matches!((ranges.next(), ranges.next()), (Some(r), None) if r == (0..text.len()))
    }
}

/// 把文本切分为交替的单词 / 非单词片段
///
/// 片段按顺序拼接后与输入完全相同；空字符串返回空列表。
pub fn segment_text(text: &str, rule: &WordRule) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut cursor = 0;

    for range in rule.word_ranges(text) {
        if range.start > cursor {
            fragments.push(Fragment::gap(&text[cursor..range.start]));
        }
        fragments.push(Fragment::word(&text[range.clone()]));
        cursor = range.end;
    }

    if cursor < text.len() {
        fragments.push(Fragment::gap(&text[cursor..]));
    }

    fragments
}

/// 一次切分的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SegmentStats {
    /// 被替换的文本节点数
    pub text_nodes: usize,
    /// 新建的包装元素数
    pub words: usize,
}

impl std::ops::AddAssign for SegmentStats {
    fn add_assign(&mut self, other: Self) {
        self.text_nodes += other.text_nodes;
        self.words += other.words;
    }
}

/// DOM 单词切分器
#[derive(Debug, Clone)]
pub struct Segmenter {
    rule: WordRule,
    marker_class: String,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(WordRule::default())
    }
}

impl Segmenter {
    pub fn new(rule: WordRule) -> Self {
        Self {
            rule,
            marker_class: WORD_CLASS.to_string(),
        }
    }

    pub fn with_marker_class(mut self, marker_class: &str) -> Self {
        self.marker_class = marker_class.to_string();
        self
    }

    pub fn rule(&self) -> &WordRule {
        &self.rule
    }

    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    /// 切分以 `node` 为根的子树
    ///
    /// 传入文本节点时，若它挂在文档中且不在排除区域内，则在父节点中原位替换。
    /// 传入元素时同样检查它的祖先，排除区域内的元素不做任何修改。
    pub fn segment(&self, node: &Handle) -> SegmentStats {
        match node.data {
            NodeData::Element { .. } if self.has_excluded_ancestor(node) => {
                SegmentStats::default()
            }
            NodeData::Text { .. } => self.segment_detached_text(node),
            _ => self.segment_subtree(node),
        }
    }

    fn segment_subtree(&self, node: &Handle) -> SegmentStats {
        match node.data {
            NodeData::Document => self.segment_children(node),
            NodeData::Element { .. } if !self.is_excluded(node) => self.segment_children(node),
            _ => SegmentStats::default(),
        }
    }

    /// 为一段文本生成替换节点；没有可包装的单词时返回 `None`
    pub fn wrap_text(&self, text: &str) -> Option<Vec<Handle>> {
        if text.trim().is_empty() {
            return None;
        }

        let fragments = segment_text(text, &self.rule);
        if !fragments.iter().any(|fragment| fragment.is_word) {
            return None;
        }

        Some(
            fragments
                .iter()
                .map(|fragment| {
                    if fragment.is_word {
                        self.create_wrapper(&fragment.text)
                    } else {
                        create_text_node(&fragment.text)
                    }
                })
                .collect(),
        )
    }

    /// 元素本身是否处于排除区域（不检查祖先）
    pub fn is_excluded(&self, node: &Handle) -> bool {
        let Some(name) = get_node_name(node) else {
            return false;
        };

        EXCLUDED_ELEMENTS.contains(&name)
            || has_class(node, &self.marker_class)
            || get_node_attr(node, SKIP_ATTRIBUTE).is_some()
    }

    /// 元素是否为本切分器生成的包装元素
    pub fn is_wrapper(&self, node: &Handle) -> bool {
        get_node_name(node) == Some("span") && has_class(node, &self.marker_class)
    }

    /// 按文档顺序收集子树中的所有包装元素
    pub fn wrappers(&self, node: &Handle) -> Vec<Handle> {
        let mut found = Vec::new();
        self.collect_wrappers(node, &mut found);
        found
    }

    fn collect_wrappers(&self, node: &Handle, found: &mut Vec<Handle>) {
        if self.is_wrapper(node) {
            found.push(node.clone());
            return;
        }
        for child in node.children.borrow().iter() {
            self.collect_wrappers(child, found);
        }
    }

    fn create_wrapper(&self, word: &str) -> Handle {
        let wrapper = create_element("span", &[("class", &self.marker_class)]);
        append_child(&wrapper, create_text_node(word));
        wrapper
    }

    fn segment_children(&self, parent: &Handle) -> SegmentStats {
        let children: Vec<Handle> = parent.children.borrow().clone();
        let mut rebuilt: Vec<Handle> = Vec::with_capacity(children.len());
        let mut stats = SegmentStats::default();
        let mut changed = false;

        for child in children {
            if let NodeData::Text { ref contents } = child.data {
                let text = contents.borrow().to_string();
                if let Some(replacements) = self.wrap_text(&text) {
                    stats.text_nodes += 1;
                    stats.words += replacements.iter().filter(|n| self.is_wrapper(n)).count();
                    for node in replacements {
                        node.parent.set(Some(Rc::downgrade(parent)));
                        rebuilt.push(node);
                    }
                    child.parent.set(None);
                    changed = true;
                    continue;
                }
            } else {
                stats += self.segment_subtree(&child);
            }
            rebuilt.push(child);
        }

        if changed {
            *parent.children.borrow_mut() = rebuilt;
        }

        stats
    }

    fn segment_detached_text(&self, node: &Handle) -> SegmentStats {
        let Some(parent) = get_parent_node(node) else {
            return SegmentStats::default();
        };
        if self.has_excluded_ancestor(node) {
            return SegmentStats::default();
        }

        let NodeData::Text { ref contents } = node.data else {
            return SegmentStats::default();
        };
        let text = contents.borrow().to_string();
        let Some(replacements) = self.wrap_text(&text) else {
            return SegmentStats::default();
        };

        let stats = SegmentStats {
            text_nodes: 1,
            words: replacements.iter().filter(|n| self.is_wrapper(n)).count(),
        };

        let mut children = parent.children.borrow_mut();
        if let Some(index) = children.iter().position(|child| Rc::ptr_eq(child, node)) {
            for replacement in replacements.iter() {
                replacement.parent.set(Some(Rc::downgrade(&parent)));
            }
            let _replaced: Vec<Handle> = children.splice(index..=index, replacements).collect();
            node.parent.set(None);
            stats
        } else {
            SegmentStats::default()
        }
    }

    fn has_excluded_ancestor(&self, node: &Handle) -> bool {
        let mut current = get_parent_node(node);
        while let Some(ancestor) = current {
            if self.is_excluded(&ancestor) {
                return true;
            }
            current = get_parent_node(&ancestor);
        }
        false
    }
}
