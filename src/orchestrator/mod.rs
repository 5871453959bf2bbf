//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! api (HTTP 请求 → EvaluationRequest)
//!     ↓
//! orchestrator::BatchEvaluator (处理 Vec<URL>，并发 + 汇总)
//!     ↓
//! workflow::PageFlow (处理单个 URL)
//!     ↓
//! services (能力层：fetch / extract / generate)
//! ```
//!
//! ## 设计原则
//!
//! 1. **失败隔离**：单个 URL 的错误只影响它自己
//! 2. **有界并发**：同时评估的页面数量受 Semaphore 限制
//! 3. **无业务逻辑**：只做调度和汇总，不做具体评分判断

pub mod batch_evaluator;

pub use batch_evaluator::BatchEvaluator;
