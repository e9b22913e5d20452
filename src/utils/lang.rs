use std::sync::OnceLock;

use regex::Regex;

static LANG_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

/// 校验语言代码，例如 `ja`、`en`、`zh-CN`、`pt-BR`、`yue`
pub fn is_valid_lang_code(code: &str) -> bool {
    LANG_CODE_REGEX
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})?$").expect("language code pattern is valid")
        })
        .is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_codes() {
        for code in ["ja", "en", "zh-CN", "zh-TW", "pt-BR", "yue", "sr-Latn"] {
            assert!(is_valid_lang_code(code), "{code}");
        }
    }

    #[test]
    fn rejects_malformed_codes() {
        for code in ["", "j", "japanese", "en_US", "en-", "ja;drop", "e1"] {
            assert!(!is_valid_lang_code(code), "{code}");
        }
    }
}
