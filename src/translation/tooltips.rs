//! 单词提示
//!
//! 从已分词的包装元素中收集单词，并把译文写入 `title` 属性。

use std::collections::{HashMap, HashSet};

use markup5ever_rcdom::Handle;

use crate::parsers::html::{set_node_attr, text_content};

/// 按出现顺序收集不重复的单词文本，最多 `limit` 个
pub fn collect_word_texts(wrappers: &[Handle], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut words = Vec::new();

    for wrapper in wrappers {
        if words.len() >= limit {
            break;
        }
        let text = text_content(wrapper);
        if !text.is_empty() && seen.insert(text.clone()) {
            words.push(text);
        }
    }

    words
}

/// 给有译文的包装元素设置 `title`，返回设置的数量
pub fn apply_tooltips(wrappers: &[Handle], translations: &HashMap<String, String>) -> usize {
    let mut applied = 0;
    for wrapper in wrappers {
        if let Some(translation) = translations.get(&text_content(wrapper)) {
            set_node_attr(wrapper, "title", Some(translation.clone()));
            applied += 1;
        }
    }
    applied
}
