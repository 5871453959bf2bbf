//! HTTP 接口层
//!
//! 浏览器插件调用 `POST /evaluate-pages`，按 URL 精确匹配返回的评分。

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use handler::{evaluate_pages_handler, health_handler};
pub use payload::EvaluatePagesPayload;
pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/evaluate-pages", post(evaluate_pages_handler))
        // 插件在检索页面上跨域调用，需要响应 OPTIONS 预检
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
