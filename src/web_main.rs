//! Web 服务器主程序入口

#[cfg(feature = "web")]
use std::sync::Arc;

#[cfg(feature = "web")]
use clap::Parser;
#[cfg(feature = "web")]
use tracing::{info, warn};
#[cfg(feature = "web")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "web")]
use wordtap::{
    env::{self, core as core_env, EnvVar},
    network::{FetchConfig, HttpFetcher},
    translation::{TranslationConfig, TranslationService},
    utils::is_valid_lang_code,
    web::{AppState, WebConfig, WebServer},
    PageOptions,
};

/// wordtap - 单词点击翻译阅读代理
#[cfg(feature = "web")]
#[derive(Parser, Debug)]
#[command(name = "wordtap-web", version, about)]
struct Args {
    /// 绑定地址 [默认: WORDTAP_BIND_ADDRESS 或 0.0.0.0]
    #[arg(short, long)]
    bind: Option<String>,

    /// 端口 [默认: PORT 或 3000]
    #[arg(short, long)]
    port: Option<u16>,

    /// 默认目标语言 [默认: WORDTAP_TARGET_LANG 或 ja]
    #[arg(short, long)]
    lang: Option<String>,

    /// 未配置翻译凭据时拒绝启动
    #[arg(long)]
    require_credentials: bool,

    /// 打印所有环境变量说明后退出
    #[arg(long)]
    env_docs: bool,
}

#[cfg(feature = "web")]
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = core_env::LogLevel::get().unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(format!("wordtap={level},tower_http={level}"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "web")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = env::load_dotenv();
    let args = Args::parse();

    if args.env_docs {
        println!("{}", env::generate_env_docs());
        return Ok(());
    }

    init_tracing();
    if let Some(file) = loaded {
        info!("已加载环境文件: {}", file);
    }

    let mut web_config = WebConfig::from_env()?;
    if let Some(bind) = args.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    web_config.validate()?;

    let mut translation_config = TranslationConfig::from_env()?;
    let mut page_options = PageOptions::from_env()?;
    if let Some(lang) = args.lang {
        if !is_valid_lang_code(&lang) {
            return Err(format!("无效的语言代码: {}", lang).into());
        }
        translation_config.default_target_lang = lang.clone();
        page_options.default_lang = lang;
    }
    translation_config.validate()?;
    page_options.validate()?;

    if args.require_credentials {
        translation_config.require_credentials()?;
    } else if !translation_config.is_configured() {
        warn!("GOOGLE_TRANSLATE_API_KEY / GOOGLE_CREDENTIALS 未设置，查词将返回占位值");
    }

    let fetch_config = FetchConfig::from_env()?;
    fetch_config.validate()?;
    let fetcher = HttpFetcher::new(fetch_config)?;
    let translator = TranslationService::from_config(translation_config);

    let state = AppState::new(
        Arc::new(fetcher),
        translator,
        page_options,
        web_config.mode.clone(),
    );

    let server = WebServer::new(web_config, state);
    server.start().await?;

    Ok(())
}

#[cfg(not(feature = "web"))]
fn main() {
    eprintln!("Error: Web feature not enabled. Please compile with --features web");
    std::process::exit(1);
}
