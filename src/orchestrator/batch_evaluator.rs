//! 批量评估器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发控制**：每个 URL 一个任务，使用 Semaphore 限制同时评估的数量
//! 2. **等待全部完成**：单个 URL 失败不会中断整个批次
//! 3. **结果汇总**：唯一的过滤规则是丢弃 `Dropped` 的 URL，其余按输入顺序返回

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::config::Config;
use crate::models::{EvaluationRequest, EvaluationResult};
use crate::services::{GenerationBackend, PageSource, StructuredGenerationClient};
use crate::utils::logging::log_batch_complete;
use crate::utils::RetryPolicy;
use crate::workflow::{PageCtx, PageFlow, PageOutcome};

/// 批量评估器
#[derive(Clone)]
pub struct BatchEvaluator {
    flow: Arc<PageFlow>,
    max_concurrent: usize,
}

impl BatchEvaluator {
    pub fn new(flow: PageFlow, max_concurrent: usize) -> Self {
        Self {
            flow: Arc::new(flow),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 按配置组装抓取器、生成客户端和流程
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn PageSource>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        let generator = StructuredGenerationClient::new(
            backend,
            RetryPolicy::new(config.generation_max_attempts),
        );
        let flow = PageFlow::new(fetcher, generator, config.max_prompt_chars);
        Self::new(flow, config.max_concurrent_evaluations)
    }

    /// 评估整个批次，返回可评分的结果
    ///
    /// 无法评分的 URL 被丢弃，不会以空分数的形式返回。
    pub async fn evaluate(&self, request: EvaluationRequest) -> Vec<EvaluationResult> {
        let total = request.urls().len();
        let results: Vec<EvaluationResult> = self
            .run_batch(request)
            .await
            .into_iter()
            .filter_map(PageOutcome::into_result)
            .collect();

        log_batch_complete(results.len(), total);
        results
    }

    /// 评估整个批次，返回每个 URL 的终态（与输入顺序一致）
    pub async fn run_batch(&self, request: EvaluationRequest) -> Vec<PageOutcome> {
        let request = Arc::new(request);
        let total = request.urls().len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        info!(
            "📦 开始评估 {} 个页面 (最大并发: {})",
            total, self.max_concurrent
        );

        let mut handles = Vec::with_capacity(total);
        for (idx, url) in request.urls().iter().enumerate() {
            let ctx = PageCtx::new(url.clone(), idx + 1, total);
            let flow = Arc::clone(&self.flow);
            let request = Arc::clone(&request);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return PageOutcome::Dropped {
                            url: ctx.url.clone(),
                            reason: e.to_string(),
                        }
                    }
                };
                flow.run(&request, &ctx).await
            });
            handles.push((url.clone(), handle));
        }

        // 等待所有任务完成
        join_all(handles.into_iter().map(|(url, handle)| async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[页面 {}] 任务执行失败: {}", url, e);
                    PageOutcome::Dropped {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
        }))
        .await
    }
}
