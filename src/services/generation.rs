//! 结构化生成客户端 - 业务能力层
//!
//! 调用生成模型，按 schema 校验输出，失败时有界重试。
//! 不合法的结构永远不会返回给调用方。

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AttemptError, BackendError, GenerationError};
use crate::models::OutputSchema;
use crate::utils::{truncate_text, RetryPolicy};

/// 生成能力（模型提供方）
///
/// 接收 prompt 和 schema，返回模型的原始文本。
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn complete(&self, prompt: &str, schema: &OutputSchema) -> Result<String, BackendError>;
}

/// 结构化生成客户端
#[derive(Clone)]
pub struct StructuredGenerationClient {
    backend: Arc<dyn GenerationBackend>,
    retry: RetryPolicy,
}

impl StructuredGenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// 生成并校验
    ///
    /// 任何失败（网络、提供方错误、JSON 不合法、schema 不符）都会立即重试，
    /// 次数用尽后返回 [`GenerationError::Exhausted`]，携带最后一次的错误。
    pub async fn generate<T>(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<T, GenerationError>
    where
        T: DeserializeOwned + Send,
    {
        debug!(
            "调用生成模型，schema: {}，prompt: {}",
            schema.name,
            truncate_text(prompt, 200)
        );

        let backend = &self.backend;
        let result = self
            .retry
            .run(
                |attempt| async move {
                    let raw = backend.complete(prompt, schema).await?;
                    debug!(
                        "第 {} 次生成返回: {}",
                        attempt,
                        truncate_text(&raw, 300)
                    );
                    parse_and_validate::<T>(&raw, schema)
                },
                |_| true,
            )
            .await;

        match result {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!("❌ 生成失败，已尝试 {} 次: {}", e.attempts, e.last);
                Err(GenerationError::Exhausted {
                    attempts: e.attempts,
                    last: e.last,
                })
            }
        }
    }
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").expect("fence regex"))
}

/// 从模型文本中取出 JSON 对象
///
/// 先按原样解析；失败时依次尝试截取最外层的 `{...}`、
/// Markdown 代码块的内容、代码块内最外层的 `{...}`。
/// 合法 JSON 中的代码块（例如写在理由里的代码示例）不会被误拆。
pub fn parse_output(raw: &str) -> Result<Value, AttemptError> {
    let trimmed = raw.trim();

    let mut candidates = vec![trimmed];
    candidates.extend(outermost_object(trimmed));
    if let Some(inner) = fence_re()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    {
        candidates.push(inner);
        candidates.extend(outermost_object(inner));
    }

    let mut last_error = String::new();
    for candidate in candidates {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(AttemptError::Parse(last_error))
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// 解析 → 逐字段校验 → 反序列化为目标类型
pub fn parse_and_validate<T: DeserializeOwned>(
    raw: &str,
    schema: &OutputSchema,
) -> Result<T, AttemptError> {
    let value = parse_output(raw)?;
    let validated = schema.validate(&value)?;
    serde_json::from_value(Value::Object(validated))
        .map_err(|e| AttemptError::Decode(e.to_string()))
}
