//! 查词 API 处理器
//!
//! 输入无效时返回 400；翻译失败或未配置时仍返回 200，译文为占位值并带 `degraded: true`。

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json as ExtractJson, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::translation::WordLookup;
use crate::web::types::{api_error, ApiError, AppState, TranslateQuery, TranslateRequest};

/// `GET /api/translate?text=&lang=`
pub async fn translate_word(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranslateQuery>,
) -> Result<Json<WordLookup>, ApiError> {
    let text = query
        .text
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "text パラメータが必要です"))?;
    lookup(&state, &text, query.lang.as_deref()).await
}

/// `POST /api/translate`，请求体为 `{ "text": ..., "lang": ... }`
///
/// 请求体无法解析时同样以 JSON 错误体返回 400。
pub async fn translate_word_json(
    State(state): State<Arc<AppState>>,
    payload: Result<ExtractJson<TranslateRequest>, JsonRejection>,
) -> Result<Json<WordLookup>, ApiError> {
    let ExtractJson(request) = payload.map_err(|rejection| {
        tracing::debug!("查词请求体无效: {}", rejection.body_text());
        api_error(StatusCode::BAD_REQUEST, "リクエスト本文が正しくありません")
    })?;
    lookup(&state, &request.text, request.lang.as_deref()).await
}

async fn lookup(
    state: &AppState,
    text: &str,
    lang: Option<&str>,
) -> Result<Json<WordLookup>, ApiError> {
    match state.translator.lookup(text, lang).await {
        Ok(result) => Ok(Json(result)),
        Err(e) if e.is_client_error() => {
            tracing::debug!("查词请求无效: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            tracing::error!("查词失败: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
