use axum::{extract::State, Json};
use tracing::info;

use crate::api::error::ApiError;
use crate::api::payload::EvaluatePagesPayload;
use crate::api::state::AppState;
use crate::models::EvaluationResult;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// 评估检索结果页面
///
/// 返回数组可能比提交的 URL 少：无法评分的页面会被丢弃。
#[tracing::instrument(skip_all)]
pub async fn evaluate_pages_handler(
    State(state): State<AppState>,
    Json(payload): Json<EvaluatePagesPayload>,
) -> Result<Json<Vec<EvaluationResult>>, ApiError> {
    let submitted = payload.urls.len();
    let request = payload.into_request(state.max_urls_per_batch)?;

    info!(
        "收到评估请求: {} 个 URL (处理 {} 个)，关键词: {}",
        submitted,
        request.urls().len(),
        request.original_keywords()
    );

    let results = state.evaluator.evaluate(request).await;
    Ok(Json(results))
}
