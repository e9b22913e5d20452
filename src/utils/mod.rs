//! # 工具模块
//!
//! - `url` - 目标地址规范化、相对地址解析、代理链接生成
//! - `lang` - 语言代码校验

pub mod lang;
pub mod url;

// Re-export commonly used items for convenience
pub use self::lang::is_valid_lang_code;
pub use self::url::{clean_url, normalize_target_url, proxy_url, resolve_url, Url};

/// 转义插入 HTML 文本或属性值的内容
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
