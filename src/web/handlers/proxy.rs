//! 代理页面处理器
//!
//! 抓取目标页面，在阻塞线程中完成解析、分词和改写，返回可点击查词的页面。

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tokio::task;
use tracing::{error, info, warn};

use crate::core::{TooltipSource, WordtapError};
use crate::utils::normalize_target_url;
use crate::web::{templates, types::AppState, types::ProxyQuery};

/// 错误对应的 HTTP 状态码
pub fn status_for(error: &WordtapError) -> StatusCode {
    match error {
        WordtapError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        WordtapError::Fetch(_) | WordtapError::UnsupportedMedia(_) => StatusCode::BAD_GATEWAY,
        WordtapError::Parse(_) | WordtapError::Serialize(_) | WordtapError::Server(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// 展示给用户的固定说明，错误详情只写入日志
fn user_message(error: &WordtapError) -> &'static str {
    match error {
        WordtapError::InvalidUrl(_) => "http または https の URL を入力してください",
        WordtapError::Fetch(_) => "ページを取得できませんでした",
        WordtapError::UnsupportedMedia(_) => "HTML ページではないため表示できません",
        WordtapError::Parse(_) | WordtapError::Serialize(_) | WordtapError::Server(_) => {
            "ページを処理できませんでした"
        }
    }
}

fn failure_page(error: &WordtapError) -> Response {
    let status = status_for(error);
    let title = if error.is_client_error() {
        warn!("代理请求无效: {}", error);
        "URL が正しくありません"
    } else {
        error!("代理页面处理失败: {}", error);
        "エラーが発生しました"
    };
    (status, Html(templates::error_page(title, user_message(error)))).into_response()
}

/// `GET /proxy?url=&lang=`
pub async fn proxy_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    let Some(raw_url) = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Html(templates::error_page(
                "url パラメータが必要です",
                "/proxy?url=https://example.com/ のように指定してください",
            )),
        )
            .into_response();
    };

    let target = match normalize_target_url(raw_url) {
        Ok(url) => url,
        Err(e) => return failure_page(&e),
    };

    let lang = state
        .translator
        .resolve_lang(query.lang.as_deref())
        .unwrap_or_else(|e| {
            warn!("{}，使用默认语言", e);
            state.translator.default_lang().to_string()
        });

    info!("代理页面: {} (lang={})", target, lang);

    let document = match state.fetcher.fetch(&target).await {
        Ok(document) => document,
        Err(e) => return failure_page(&e),
    };

    let processor = state.processor.clone();
    let translator = state.translator.clone();
    let prefetch = processor.options().prefetch_tooltips && translator.is_enabled();

    // RcDom 不是 Send，整个处理过程留在同一个阻塞线程中
    let result = task::spawn_blocking(move || {
        let runtime = tokio::runtime::Handle::current();
        let source = |words: Vec<String>| runtime.block_on(translator.translate_many(words, &lang));
        let tooltip_source: Option<TooltipSource<'_>> = if prefetch { Some(&source) } else { None };
        processor.process_page(&document, &lang, tooltip_source)
    })
    .await
    .unwrap_or_else(|e| Err(WordtapError::Server(format!("处理任务失败: {}", e))));

    match result {
        Ok(page) => Html(page.html).into_response(),
        Err(e) => failure_page(&e),
    }
}
