//! # Page Evaluator
//!
//! 为检索结果页面打分的 HTTP 服务：抓取每个结果页面，清洗为纯文本，
//! 交给生成模型按检索词和问题评分，返回结构化的分数。
//!
//! ## 架构设计
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面
//! - `HttpPageFetcher` - 抓取页面（失败即空页面）
//! - `text_extractor` - HTML → 纯文本
//! - `StructuredGenerationClient` - 结构化生成（重试 + schema 校验）
//! - `LlmService` - OpenAI 兼容的模型后端
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一个 URL"的完整处理流程
//! - `PageCtx` - 上下文封装（URL + 批次位置）
//! - `PageFlow` - 流程编排（fetch → extract → prompt → generate）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_evaluator` - 批量评估，管理并发和失败策略
//!
//! ### ④ 接口层（API）
//! - `api/` - axum 路由，`POST /evaluate-pages`

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{GenerationError, RequestValidationError};
pub use models::{Evaluation, EvaluationRequest, EvaluationResult};
pub use orchestrator::BatchEvaluator;
pub use workflow::{PageFlow, PageOutcome};
