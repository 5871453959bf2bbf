//! 页面抓取服务 - 业务能力层
//!
//! 只负责 "把 URL 变成原始页面"。
//! 第三方页面不可控：任何失败都记为空页面，不重试、不向上抛错。

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::FetchFailure;
use crate::models::FetchedPage;

/// 页面来源
#[async_trait]
pub trait PageSource: Send + Sync {
    /// 获取页面；失败时返回 `raw_body` 为空的页面
    async fn fetch_page(&self, url: &str) -> FetchedPage;
}

/// 基于 reqwest 的页面抓取器
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpPageFetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Self::with_settings(config.fetch_timeout(), config.max_body_bytes, &config.user_agent)
    }

    pub fn with_settings(
        timeout: Duration,
        max_body_bytes: usize,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_body_bytes,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchFailure> {
        let request = async {
            let mut response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,*/*;q=0.8",
                )
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchFailure::Status(status.as_u16()));
            }

            // 分块读取，达到上限即停止，不等待剩余内容
            let mut body = Vec::new();
            while let Some(chunk) = response.chunk().await? {
                body.extend_from_slice(&chunk);
                if body.len() >= self.max_body_bytes {
                    debug!("页面超过 {} 字节，停止读取: {}", self.max_body_bytes, url);
                    break;
                }
            }

            Ok::<_, FetchFailure>(decode_body(body, self.max_body_bytes))
        };

        // 超时覆盖整个请求，包括读取 body
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| FetchFailure::Timeout(self.timeout.as_secs()))?
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> FetchedPage {
        match self.try_fetch(url).await {
            Ok(body) => {
                debug!("抓取成功: {} ({} 字节)", url, body.len());
                FetchedPage::new(url, body)
            }
            Err(e) => {
                warn!("⚠️ 抓取失败，按空页面处理: {} ({})", url, e);
                FetchedPage::empty(url)
            }
        }
    }
}

/// 截断到 `max_bytes` 并解码为 UTF-8
///
/// 截断点落在多字节字符中间时丢弃残缺的尾部，其余非法字节替换为 U+FFFD。
fn decode_body(mut bytes: Vec<u8>, max_bytes: usize) -> String {
    bytes.truncate(max_bytes);
    if let Err(e) = std::str::from_utf8(&bytes) {
        if e.error_len().is_none() {
            bytes.truncate(e.valid_up_to());
        }
    }
    let mut body = String::from_utf8_lossy(&bytes).into_owned();
    truncate_at_char_boundary(&mut body, max_bytes);
    body
}

fn truncate_at_char_boundary(body: &mut String, max_bytes: usize) {
    if body.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, Bytes},
        http::StatusCode,
        response::Html,
        routing::get,
        Router,
    };
    use futures::StreamExt;
    use std::net::SocketAddr;

    async fn spawn_test_server() -> SocketAddr {
        let app = Router::new()
            .route("/ok", get(ok_page))
            .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
            .route("/slow", get(slow_page))
            .route("/big", get(|| async { "あ".repeat(100) }))
            .route("/endless", get(endless_page));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn ok_page() -> Html<&'static str> {
        Html("<html><body><p>hello</p></body></html>")
    }

    async fn slow_page() -> Html<&'static str> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Html("<p>too late</p>")
    }

    /// 永不结束的响应，每块 4 KiB
    async fn endless_page() -> Body {
        let chunks = futures::stream::repeat_with(|| {
            Ok::<_, std::io::Error>(Bytes::from(vec![b'a'; 4096]))
        })
        .then(|chunk| async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            chunk
        });
        Body::from_stream(chunks)
    }

    fn fetcher(timeout: Duration, max_body_bytes: usize) -> HttpPageFetcher {
        HttpPageFetcher::with_settings(timeout, max_body_bytes, "page-evaluator-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let addr = spawn_test_server().await;
        let url = format!("http://{}/ok", addr);

        let page = fetcher(Duration::from_secs(5), 1024).fetch_page(&url).await;

        assert_eq!(page.url, url);
        assert!(page.raw_body.contains("<p>hello</p>"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_empty_page() {
        let addr = spawn_test_server().await;
        let url = format!("http://{}/missing", addr);

        let page = fetcher(Duration::from_secs(5), 1024).fetch_page(&url).await;

        assert_eq!(page.url, url);
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_empty_page() {
        let addr = spawn_test_server().await;
        let url = format!("http://{}/slow", addr);

        let page = fetcher(Duration::from_millis(200), 1024)
            .fetch_page(&url)
            .await;

        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_empty_page() {
        let page = fetcher(Duration::from_secs(2), 1024)
            .fetch_page("http://127.0.0.1:1/")
            .await;
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_body_truncated_on_char_boundary() {
        let addr = spawn_test_server().await;
        let url = format!("http://{}/big", addr);

        // "あ" 占 3 字节，10 字节只能保留 3 个字符
        let page = fetcher(Duration::from_secs(5), 10).fetch_page(&url).await;

        assert_eq!(page.raw_body, "あああ");
    }

    #[tokio::test]
    async fn test_endless_body_stops_at_cap() {
        let addr = spawn_test_server().await;
        let url = format!("http://{}/endless", addr);

        let page = fetcher(Duration::from_secs(1), 1024).fetch_page(&url).await;

        assert_eq!(page.raw_body.len(), 1024);
        assert!(page.raw_body.bytes().all(|b| b == b'a'));
    }

    #[test]
    fn test_decode_body_drops_split_char() {
        // "あい" 共 6 字节，截断到 4 字节时 "い" 被切断
        assert_eq!(decode_body("あい".as_bytes().to_vec(), 4), "あ");
        assert_eq!(decode_body(b"abc".to_vec(), 10), "abc");
    }
}
