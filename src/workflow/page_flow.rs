//! 页面处理流程 - 流程层
//!
//! 核心职责：定义"一个 URL"的完整处理流程
//!
//! 状态只向前推进：
//! `Fetching → Extracting → Scoring → {Scored | Dropped}`

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{Evaluation, EvaluationRequest, EvaluationResult, OutputSchema};
use crate::services::text_extractor;
use crate::services::{PageSource, StructuredGenerationClient};
use crate::workflow::page_ctx::PageCtx;
use crate::workflow::prompt::ScoringPrompt;

/// 单个 URL 的处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Fetching,
    Extracting,
    Scoring,
    Scored,
    Dropped,
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageState::Fetching => "抓取中",
            PageState::Extracting => "提取中",
            PageState::Scoring => "评分中",
            PageState::Scored => "已评分",
            PageState::Dropped => "已丢弃",
        };
        write!(f, "{}", name)
    }
}

/// 页面处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// 评分成功，进入最终结果
    Scored(EvaluationResult),
    /// 无法评分，从最终结果中移除
    Dropped { url: String, reason: String },
}

impl PageOutcome {
    pub fn state(&self) -> PageState {
        match self {
            PageOutcome::Scored(_) => PageState::Scored,
            PageOutcome::Dropped { .. } => PageState::Dropped,
        }
    }

    pub fn into_result(self) -> Option<EvaluationResult> {
        match self {
            PageOutcome::Scored(result) => Some(result),
            PageOutcome::Dropped { .. } => None,
        }
    }
}

/// 页面处理流程
///
/// - 编排 抓取 → 提取 → 构建 prompt → 结构化生成
/// - 不持有请求级别的状态，可在多个任务间共享
pub struct PageFlow {
    fetcher: Arc<dyn PageSource>,
    generator: StructuredGenerationClient,
    schema: OutputSchema,
    max_prompt_chars: usize,
}

impl PageFlow {
    pub fn new(
        fetcher: Arc<dyn PageSource>,
        generator: StructuredGenerationClient,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            generator,
            schema: Evaluation::schema(),
            max_prompt_chars,
        }
    }

    pub async fn run(&self, request: &EvaluationRequest, ctx: &PageCtx) -> PageOutcome {
        // ========== 抓取 ==========
        self.enter(ctx, PageState::Fetching);
        let page = self.fetcher.fetch_page(&ctx.url).await;
        if page.is_empty() {
            warn!("{} ⚠️ 页面内容为空，仍然提交评分", ctx);
        }

        // ========== 提取 ==========
        self.enter(ctx, PageState::Extracting);
        let extracted = text_extractor::extract_page(&page);
        debug!("{} 提取正文 {} 字符", ctx, extracted.text.chars().count());

        // ========== 评分 ==========
        self.enter(ctx, PageState::Scoring);
        let prompt = ScoringPrompt {
            original_keywords: request.original_keywords(),
            suggested_question: request.suggested_question(),
            url: &ctx.url,
            page_text: &extracted.text,
            max_page_chars: self.max_prompt_chars,
        }
        .render();

        let outcome = match self.generator.generate::<Evaluation>(&prompt, &self.schema).await {
            Ok(evaluation) => {
                info!("{} ✓ 总合评价: {:?}", ctx, evaluation.overall);
                debug!("{} 评价结果: {:?}", ctx, evaluation);
                PageOutcome::Scored(EvaluationResult::new(ctx.url.clone(), evaluation))
            }
            Err(e) => {
                warn!("{} ❌ 无法评分，已丢弃: {}", ctx, e);
                PageOutcome::Dropped {
                    url: ctx.url.clone(),
                    reason: e.to_string(),
                }
            }
        };

        self.enter(ctx, outcome.state());
        outcome
    }

    fn enter(&self, ctx: &PageCtx, state: PageState) {
        debug!("{} → {}", ctx, state);
    }
}
