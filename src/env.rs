//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，所有变量按用途分组。

use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 应用运行模式
    pub struct Mode;
    impl EnvVar<String> for Mode {
        const NAME: &'static str = "WORDTAP_MODE";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("production".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Application mode: development, staging, production";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                "development" | "dev" => Ok("development".to_string()),
                "staging" | "stage" => Ok("staging".to_string()),
                "production" | "prod" => Ok("production".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid mode '{}'. Use: development, staging, production",
                        value
                    ),
                }),
            }
        }
    }

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "WORDTAP_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "WORDTAP_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("0.0.0.0".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Web server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口（沿用托管平台约定的 PORT）
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "PORT";
        const DEFAULT: Option<u16> = Some(3000);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }
}

/// 页面抓取相关环境变量
pub mod fetch {
    use super::*;

    /// 抓取超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "WORDTAP_FETCH_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15));
        const DESCRIPTION: &'static str = "Page fetch timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 120)
        }
    }

    /// 抓取时使用的 User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "WORDTAP_USER_AGENT";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::network::DEFAULT_USER_AGENT.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "User-Agent header sent when fetching pages";

        fn parse(value: &str) -> EnvResult<String> {
            let agent = value.trim();
            if agent.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User-Agent cannot be empty".to_string(),
                });
            }
            Ok(agent.to_string())
        }
    }

    /// 文档最大字节数
    pub struct MaxDocumentBytes;
    impl EnvVar<usize> for MaxDocumentBytes {
        const NAME: &'static str = "WORDTAP_MAX_DOCUMENT_BYTES";
        const DEFAULT: Option<usize> = Some(5 * 1024 * 1024);
        const DESCRIPTION: &'static str = "Largest page body accepted from the remote site";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1024, 64 * 1024 * 1024)
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// Google 凭据 JSON
    pub struct Credentials;
    impl EnvVar<String> for Credentials {
        const NAME: &'static str = "GOOGLE_CREDENTIALS";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Cloud translation credentials as a JSON document";

        fn parse(value: &str) -> EnvResult<String> {
            let json = value.trim();
            if json.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Credentials cannot be empty".to_string(),
                });
            }
            Ok(json.to_string())
        }
    }

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "GOOGLE_TRANSLATE_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Cloud translation API key";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 翻译 API 地址
    pub struct Endpoint;
    impl EnvVar<String> for Endpoint {
        const NAME: &'static str = "WORDTAP_TRANSLATION_ENDPOINT";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::config::constants::DEFAULT_ENDPOINT.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 默认目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "WORDTAP_TARGET_LANG";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::config::constants::DEFAULT_TARGET_LANG.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Default target language (BCP-47 style code)";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            if crate::utils::is_valid_lang_code(lang) {
                Ok(lang.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid language code '{}'", value),
                })
            }
        }
    }

    /// 源语言（不设置时由翻译服务自动检测）
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "WORDTAP_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language; unset means automatic detection";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            if crate::utils::is_valid_lang_code(lang) {
                Ok(lang.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid language code '{}'", value),
                })
            }
        }
    }

    /// 单次翻译超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "WORDTAP_TRANSLATION_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(5));
        const DESCRIPTION: &'static str = "Translation request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 60)
        }
    }

    /// 翻译不可用时的占位策略
    pub struct Placeholder;
    impl EnvVar<String> for Placeholder {
        const NAME: &'static str = "WORDTAP_PLACEHOLDER";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("marker".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Fallback when translation fails: original, empty, marker";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                policy @ ("original" | "empty" | "marker") => Ok(policy.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid placeholder policy '{}'. Use: original, empty, marker",
                        value
                    ),
                }),
            }
        }
    }
}

/// 页面改写相关环境变量
pub mod page {
    use super::*;

    /// 最短单词长度（字符数）
    pub struct MinWordLength;
    impl EnvVar<usize> for MinWordLength {
        const NAME: &'static str = "WORDTAP_MIN_WORD_LENGTH";
        const DEFAULT: Option<usize> = Some(1);
        const DESCRIPTION: &'static str = "Shortest run of letters that is wrapped as a word";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 32)
        }
    }

    /// 统一字号
    pub struct FontSize;
    impl EnvVar<u32> for FontSize {
        const NAME: &'static str = "WORDTAP_FONT_SIZE";
        const DEFAULT: Option<u32> = Some(30);
        const DESCRIPTION: &'static str = "Font size in pixels forced onto proxied pages";

        fn parse(value: &str) -> EnvResult<u32> {
            parse_positive_usize(value, Self::NAME, 10, 60).map(|size| size as u32)
        }
    }

    /// 是否把页面内链接改写为代理链接
    pub struct RewriteLinks;
    impl EnvVar<bool> for RewriteLinks {
        const NAME: &'static str = "WORDTAP_REWRITE_LINKS";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Route in-page links back through the proxy";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 是否预先填充单词提示
    pub struct PrefetchTooltips;
    impl EnvVar<bool> for PrefetchTooltips {
        const NAME: &'static str = "WORDTAP_PREFETCH_TOOLTIPS";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Translate words while rendering and show them as tooltips";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 预取的不同单词上限
    pub struct PrefetchLimit;
    impl EnvVar<usize> for PrefetchLimit {
        const NAME: &'static str = "WORDTAP_PREFETCH_LIMIT";
        const DEFAULT: Option<usize> = Some(300);
        const DESCRIPTION: &'static str = "Maximum distinct words translated for tooltips per page";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 5000)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds < min || seconds > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Timeout must be between {} and {} seconds", min, max),
        });
    }

    Ok(Duration::from_secs(seconds))
}

/// 按优先级加载 .env 文件，找到第一个即停止
pub fn load_dotenv() -> Option<&'static str> {
    let env_files = [
        ".env.local",       // 本地环境，最高优先级
        ".env.development", // 开发环境
        ".env.production",  // 生产环境
        ".env",             // 默认 .env 文件
    ];

    for env_file in env_files {
        if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
            return Some(env_file);
        }
    }

    None
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let entries: [(&str, &str); 19] = [
        (core::Mode::NAME, core::Mode::DESCRIPTION),
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (web::BindAddress::NAME, web::BindAddress::DESCRIPTION),
        (web::Port::NAME, web::Port::DESCRIPTION),
        (fetch::Timeout::NAME, fetch::Timeout::DESCRIPTION),
        (fetch::UserAgent::NAME, fetch::UserAgent::DESCRIPTION),
        (fetch::MaxDocumentBytes::NAME, fetch::MaxDocumentBytes::DESCRIPTION),
        (translation::Credentials::NAME, translation::Credentials::DESCRIPTION),
        (translation::ApiKey::NAME, translation::ApiKey::DESCRIPTION),
        (translation::Endpoint::NAME, translation::Endpoint::DESCRIPTION),
        (translation::TargetLang::NAME, translation::TargetLang::DESCRIPTION),
        (translation::SourceLang::NAME, translation::SourceLang::DESCRIPTION),
        (translation::Timeout::NAME, translation::Timeout::DESCRIPTION),
        (translation::Placeholder::NAME, translation::Placeholder::DESCRIPTION),
        (page::MinWordLength::NAME, page::MinWordLength::DESCRIPTION),
        (page::FontSize::NAME, page::FontSize::DESCRIPTION),
        (page::RewriteLinks::NAME, page::RewriteLinks::DESCRIPTION),
        (page::PrefetchTooltips::NAME, page::PrefetchTooltips::DESCRIPTION),
        (page::PrefetchLimit::NAME, page::PrefetchLimit::DESCRIPTION),
    ];

    let mut docs = String::from("# Environment Variables\n\n");
    for (name, description) in entries {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }
    docs
}
