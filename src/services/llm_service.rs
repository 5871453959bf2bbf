//! LLM 服务 - 业务能力层
//!
//! [`GenerationBackend`] 的 OpenAI 兼容实现
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Workers AI 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BackendError;
use crate::models::OutputSchema;
use crate::services::generation::GenerationBackend;

/// LLM 服务
///
/// 职责：
/// - 把 prompt 和 schema 发送给模型
/// - 只返回原始文本，解析和校验交给 `StructuredGenerationClient`
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
        }
    }

    fn build_messages(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Vec<ChatCompletionRequestMessage>, BackendError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message(schema))
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system),
            ChatCompletionRequestMessage::User(user),
        ])
    }
}

#[async_trait]
impl GenerationBackend for LlmService {
    async fn complete(&self, prompt: &str, schema: &OutputSchema) -> Result<String, BackendError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.chars().count());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(self.build_messages(prompt, schema)?)
            .temperature(self.temperature)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            BackendError::ApiCallFailed {
                model: self.model_name.clone(),
                message: e.to_string(),
            }
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BackendError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

/// 系统消息：只允许输出符合 schema 的 JSON
fn system_message(schema: &OutputSchema) -> String {
    let schema_json =
        serde_json::to_string_pretty(&schema.to_json_schema()).unwrap_or_default();
    format!(
        "あなたは検索結果のページを評価するアシスタントです。\n\
         回答は次の JSON Schema に従う JSON オブジェクトのみを出力してください。\
         説明文やコードブロックは不要です。\n\n{}",
        schema_json
    )
}
