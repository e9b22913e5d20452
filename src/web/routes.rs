//! Web 路由定义

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::web::{handlers::*, types::AppState};

/// 创建路由结构
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // 页面
        .route("/", get(index))
        .route("/proxy", get(proxy_page))
        // API
        .route("/api/translate", get(translate_word).post(translate_word_json))
        .route("/healthz", get(health_check))
}
