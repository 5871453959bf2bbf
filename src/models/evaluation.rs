use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RequestValidationError;
use crate::models::schema::{FieldSpec, OutputSchema};

/// 总合评价字段名
pub const OVERALL_FIELD: &str = "総合評価";
/// 理由字段名
pub const REASON_FIELD: &str = "理由";

/// 评估轴，按优先级排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    /// 信赖性
    Reliability,
    /// 有用性
    Usefulness,
    /// 最终更新日
    Recency,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Reliability, Axis::Usefulness, Axis::Recency];

    /// 对外使用的字段名
    pub fn label(self) -> &'static str {
        match self {
            Axis::Reliability => "信頼性",
            Axis::Usefulness => "有用性",
            Axis::Recency => "最終更新日",
        }
    }

    /// 写入 prompt 的评分说明
    pub fn rubric(self) -> &'static str {
        match self {
            Axis::Reliability => "公式docs / 学術論文 / 信頼できる情報源からの引用",
            Axis::Usefulness => "ユーザーが知りたい情報に対して適切な情報を含んでいるか",
            Axis::Recency => "最終更新日が含まれていない場合は無視し、総合評価に影響を与えない",
        }
    }

    /// 最终更新日在页面中可能不存在，因此允许为空
    fn required(self) -> bool {
        !matches!(self, Axis::Recency)
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 评分请求
///
/// 构造后不可变；URL 列表在构造时截断到批次上限。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    urls: Vec<String>,
    original_keywords: String,
    suggested_question: String,
}

impl EvaluationRequest {
    pub fn new(
        mut urls: Vec<String>,
        original_keywords: impl Into<String>,
        suggested_question: impl Into<String>,
        max_urls: usize,
    ) -> Result<Self, RequestValidationError> {
        let original_keywords = original_keywords.into();
        let suggested_question = suggested_question.into();

        if urls.is_empty() {
            return Err(RequestValidationError::EmptyUrls);
        }
        // 超出上限的 URL 不会被评估，也不参与校验
        urls.truncate(max_urls);
        for (index, url) in urls.iter().enumerate() {
            let url = url.trim();
            if url.is_empty() {
                return Err(RequestValidationError::BlankUrl { index });
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RequestValidationError::UnsupportedUrl {
                    url: url.to_string(),
                });
            }
        }
        if original_keywords.trim().is_empty() {
            return Err(RequestValidationError::EmptyKeywords);
        }
        if suggested_question.trim().is_empty() {
            return Err(RequestValidationError::MissingQuestion);
        }

        Ok(Self {
            urls,
            original_keywords,
            suggested_question,
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn original_keywords(&self) -> &str {
        &self.original_keywords
    }

    pub fn suggested_question(&self) -> &str {
        &self.suggested_question
    }
}

/// 抓取结果，失败时 `raw_body` 为空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub raw_body: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, raw_body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw_body: raw_body.into(),
        }
    }

    pub fn empty(url: impl Into<String>) -> Self {
        Self::new(url, String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.raw_body.is_empty()
    }
}

/// 清洗后的页面正文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub url: String,
    pub text: String,
}

/// 模型给出的评价，字段名与对外 JSON 一致
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(rename = "信頼性", default)]
    pub reliability: Option<u8>,
    #[serde(rename = "有用性", default)]
    pub usefulness: Option<u8>,
    #[serde(rename = "最終更新日", default)]
    pub recency: Option<u8>,
    #[serde(rename = "総合評価", default)]
    pub overall: Option<u8>,
    #[serde(rename = "理由", default)]
    pub reason: Option<String>,
}

impl Evaluation {
    /// 模型输出需要满足的 schema
    pub fn schema() -> OutputSchema {
        let mut fields: Vec<FieldSpec> = Axis::ALL
            .into_iter()
            .map(|axis| {
                let spec = FieldSpec::integer(axis.label(), 0, 10).describe(axis.rubric());
                if axis.required() {
                    spec
                } else {
                    spec.optional()
                }
            })
            .collect();
        fields.push(FieldSpec::integer(OVERALL_FIELD, 0, 10).describe("総合評価 (0-10)"));
        fields.push(FieldSpec::string(REASON_FIELD).describe("全体的な理由 (簡潔に)"));
        OutputSchema::new("page_evaluation", fields)
    }

    pub fn axis_score(&self, axis: Axis) -> Option<u8> {
        match axis {
            Axis::Reliability => self.reliability,
            Axis::Usefulness => self.usefulness,
            Axis::Recency => self.recency,
        }
    }
}

/// 单个 URL 的评分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub url: String,
    pub evaluation: Evaluation,
}

impl EvaluationResult {
    pub fn new(url: impl Into<String>, evaluation: Evaluation) -> Self {
        Self {
            url: url.into(),
            evaluation,
        }
    }

    pub fn scores(&self) -> BTreeMap<Axis, Option<u8>> {
        Axis::ALL
            .into_iter()
            .map(|axis| (axis, self.evaluation.axis_score(axis)))
            .collect()
    }

    pub fn overall_score(&self) -> Option<u8> {
        self.evaluation.overall
    }

    pub fn reason(&self) -> Option<&str> {
        self.evaluation.reason.as_deref()
    }
}
