use thiserror::Error;

/// 顶层请求校验错误，直接返回给调用方，不重试
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    /// URL 列表为空
    #[error("urls 不能为空")]
    EmptyUrls,
    /// URL 为空白字符串
    #[error("第 {index} 个 URL 为空")]
    BlankUrl { index: usize },
    /// URL 不是 http(s)
    #[error("不支持的 URL: {url}")]
    UnsupportedUrl { url: String },
    /// 检索关键词为空
    #[error("original_keywords 不能为空")]
    EmptyKeywords,
    /// 没有提供问题
    #[error("suggested_question 不能为空")]
    MissingQuestion,
}

/// 页面抓取失败。仅在抓取器内部使用，对外恢复为空页面
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP 状态码 {0}")]
    Status(u16),
    #[error("超时 ({0} 秒)")]
    Timeout(u64),
}

/// 生成后端（模型提供方）调用失败
#[derive(Debug, Error)]
pub enum BackendError {
    /// API 调用失败
    #[error("模型 API 调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("模型返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 构建请求失败
    #[error("构建请求失败: {0}")]
    InvalidRequest(String),
}

/// 输出与 schema 不符
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("输出不是 JSON 对象")]
    NotAnObject,
    #[error("缺少必填字段 `{field}`")]
    MissingField { field: String },
    #[error("字段 `{field}` 类型错误，期望 {expected}")]
    WrongType { field: String, expected: &'static str },
    #[error("字段 `{field}` 的值 {value} 超出范围 [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// 单次生成尝试失败的原因
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("无法解析 JSON: {0}")]
    Parse(String),
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
    #[error("无法转换为目标类型: {0}")]
    Decode(String),
}

/// 所有尝试都失败后返回给调用方的错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("已尝试 {attempts} 次仍失败: {last}")]
    Exhausted { attempts: u32, last: AttemptError },
}

impl GenerationError {
    /// 实际尝试次数
    pub fn attempts(&self) -> u32 {
        match self {
            GenerationError::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// 最后一次失败的原因
    pub fn last_error(&self) -> &AttemptError {
        match self {
            GenerationError::Exhausted { last, .. } => last,
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: &'static str, reason: String },
}
