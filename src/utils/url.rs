//! URL 处理工具

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
pub use url::Url;

use crate::core::WordtapError;

/// 查询参数值的编码集：除非保留字符外全部编码
pub const URL_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b':')
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'[')
    .add(b']')
    .add(b'@')
    .add(b'!')
    .add(b'$')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b';')
    .add(b'=')
    .add(b'%');

/// 规范化用户输入的目标地址
///
/// 缺少协议时补 `https://`；只接受带主机名的 http/https 地址。
pub fn normalize_target_url(input: &str) -> Result<Url, WordtapError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WordtapError::InvalidUrl("url is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };

    let url = Url::parse(&candidate)
        .map_err(|e| WordtapError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    if !is_http_url(&url) {
        return Err(WordtapError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(WordtapError::InvalidUrl(format!("{} has no host", trimmed)));
    }

    Ok(url)
}

/// 是否为 http/https 地址
pub fn is_http_url(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}

/// 相对 `from` 解析地址
pub fn resolve_url(from: &Url, to: &str) -> Option<Url> {
    from.join(to.trim()).ok()
}

/// 去掉片段标识（片段不会发送给服务器）
pub fn clean_url(url: Url) -> Url {
    let mut url = url;
    url.set_fragment(None);
    url
}

/// 生成经由本服务打开 `target` 的相对链接，保留片段以便页内跳转
pub fn proxy_url(target: &Url, lang: &str) -> String {
    let fragment = target.fragment().map(|f| format!("#{}", f)).unwrap_or_default();
    let fetched = clean_url(target.clone());

    format!(
        "/proxy?url={}&lang={}{}",
        utf8_percent_encode(fetched.as_str(), URL_ENCODE_SET),
        utf8_percent_encode(lang, URL_ENCODE_SET),
        fragment
    )
}
