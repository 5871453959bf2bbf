mod common;

use std::sync::Arc;

use axum::{body::Body, http::Request, http::StatusCode, Router};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::{html, Behavior, StubBackend, StubFetcher};
use page_evaluator::api::{create_router, AppState, ErrorResponse};
use page_evaluator::{BatchEvaluator, Config};

const A: &str = "https://a.example";
const B: &str = "https://b.example";

fn router(fetcher: Arc<StubFetcher>, backend: Arc<StubBackend>) -> Router {
    let config = Config::default();
    let evaluator = BatchEvaluator::from_config(&config, fetcher, backend);
    create_router(AppState::new(evaluator, config.max_urls_per_batch))
}

fn default_router() -> Router {
    let fetcher = StubFetcher::new(&[(A, html("alpha").as_str()), (B, html("beta").as_str())]);
    let backend = Arc::new(StubBackend::new(&[
        (A, Behavior::Score(8)),
        (B, Behavior::Score(3)),
    ]));
    router(fetcher, backend)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_evaluate_pages_returns_scores_per_url() {
    let app = default_router();

    let response = app
        .oneshot(post_json(
            "/evaluate-pages",
            serde_json::json!({
                "urls": [A, B],
                "original_keywords": "rust ownership",
                "suggested_question": "How does Rust's borrow checker work?"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["url"], A);
    assert_eq!(entries[0]["evaluation"]["総合評価"], 8);
    assert_eq!(entries[1]["url"], B);
    assert_eq!(entries[1]["evaluation"]["総合評価"], 3);
    assert!(entries[0]["evaluation"]["理由"].is_string());
}

#[tokio::test]
async fn test_failed_urls_are_omitted() {
    let fetcher = StubFetcher::new(&[(A, html("alpha").as_str()), (B, html("beta").as_str())]);
    let backend = Arc::new(StubBackend::new(&[(A, Behavior::Score(6)), (B, Behavior::Fail)]));
    let app = router(fetcher, backend);

    let response = app
        .oneshot(post_json(
            "/evaluate-pages",
            serde_json::json!({
                "urls": [A, B],
                "original_keywords": "rust",
                "suggested_questions": ["what is rust?"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["url"], A);
}

#[tokio::test]
async fn test_missing_urls_is_bad_request() {
    let app = default_router();

    let response = app
        .oneshot(post_json(
            "/evaluate-pages",
            serde_json::json!({
                "original_keywords": "rust",
                "suggested_question": "why?"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.code, 400);
    assert!(error.error.contains("urls"));
}

#[tokio::test]
async fn test_unsupported_scheme_is_bad_request() {
    let fetcher = StubFetcher::new(&[]);
    let backend = Arc::new(StubBackend::new(&[]));
    let app = router(fetcher.clone(), backend.clone());

    let response = app
        .oneshot(post_json(
            "/evaluate-pages",
            serde_json::json!({
                "urls": ["ftp://a.example"],
                "original_keywords": "rust",
                "suggested_question": "why?"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // 校验失败时不抓取也不调用模型
    assert!(fetcher.fetched().is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_extra_urls_are_truncated() {
    let mut urls: Vec<String> = (1..=6).map(|i| format!("https://{}.example", i)).collect();
    // 超出上限的非法 URL 不影响请求
    urls.push("ftp://late.example".to_string());
    let behaviors: Vec<(&str, Behavior)> = urls
        .iter()
        .map(|u| (u.as_str(), Behavior::Score(5)))
        .collect();
    let fetcher = StubFetcher::new(&[]);
    let backend = Arc::new(StubBackend::new(&behaviors));
    let app = router(fetcher.clone(), backend);

    let response = app
        .oneshot(post_json(
            "/evaluate-pages",
            serde_json::json!({
                "urls": urls,
                "original_keywords": "rust",
                "suggested_question": "why?"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 5);
    assert_eq!(fetcher.fetched().len(), 5);
}

#[tokio::test]
async fn test_healthz() {
    let response = default_router()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = default_router()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/evaluate-pages")
                .header("origin", "https://www.google.com")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
