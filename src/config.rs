use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 单次请求最多评估的 URL 数量
pub const MAX_BATCH_URLS: usize = 5;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 文件（可选）→ 环境变量。
/// 不包含任何内置密钥，`llm_api_key` 必须由外部提供。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 服务配置 ---
    pub bind_addr: String,
    pub port: u16,
    /// 单次请求最多评估的 URL 数量，超出部分被截断
    pub max_urls_per_batch: usize,
    /// 同时进行评估的页面数量
    pub max_concurrent_evaluations: usize,
    // --- 页面抓取配置 ---
    pub fetch_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub user_agent: String,
    // --- 生成配置 ---
    /// 每个页面的最大生成尝试次数（含第一次）
    pub generation_max_attempts: u32,
    /// 写入 prompt 的页面正文最大字符数
    pub max_prompt_chars: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8787,
            max_urls_per_batch: MAX_BATCH_URLS,
            max_concurrent_evaluations: 5,
            fetch_timeout_secs: 10,
            max_body_bytes: 2 * 1024 * 1024,
            user_agent: "Mozilla/5.0 (compatible; page-evaluator/0.1)".to_string(),
            generation_max_attempts: 3,
            max_prompt_chars: 6000,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.2,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().overlay_env(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 加载完整配置并校验
    ///
    /// `path` 为 `None` 时只使用默认值和环境变量。
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.overlay_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// 用环境变量覆盖已有配置，无法解析的值保持原样
    pub fn overlay_env(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = &lookup;
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(self.bind_addr),
            port: parse_var(lookup, "PORT").unwrap_or(self.port),
            max_urls_per_batch: parse_var(lookup, "MAX_URLS_PER_BATCH")
                .unwrap_or(self.max_urls_per_batch),
            max_concurrent_evaluations: parse_var(lookup, "MAX_CONCURRENT_EVALUATIONS")
                .unwrap_or(self.max_concurrent_evaluations),
            fetch_timeout_secs: parse_var(lookup, "FETCH_TIMEOUT_SECS")
                .unwrap_or(self.fetch_timeout_secs),
            max_body_bytes: parse_var(lookup, "MAX_BODY_BYTES").unwrap_or(self.max_body_bytes),
            user_agent: lookup("FETCH_USER_AGENT").unwrap_or(self.user_agent),
            generation_max_attempts: parse_var(lookup, "GENERATION_MAX_ATTEMPTS")
                .unwrap_or(self.generation_max_attempts),
            max_prompt_chars: parse_var(lookup, "MAX_PROMPT_CHARS")
                .unwrap_or(self.max_prompt_chars),
            llm_api_key: lookup("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: parse_var(lookup, "LLM_TEMPERATURE").unwrap_or(self.llm_temperature),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_urls_per_batch == 0 {
            return Err(invalid("max_urls_per_batch", "必须大于 0"));
        }
        if self.max_concurrent_evaluations == 0 {
            return Err(invalid("max_concurrent_evaluations", "必须大于 0"));
        }
        if self.generation_max_attempts == 0 {
            return Err(invalid("generation_max_attempts", "必须大于 0"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(invalid("fetch_timeout_secs", "必须大于 0"));
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(invalid("llm_temperature", "必须在 [0, 2] 之间"));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
