use serde::{Deserialize, Serialize};

use crate::error::RequestValidationError;
use crate::models::EvaluationRequest;

/// `POST /evaluate-pages` 请求体
///
/// 字段都有默认值，缺失字段由 [`EvaluationRequest::new`] 统一报 400。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluatePagesPayload {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub original_keywords: String,
    #[serde(default)]
    pub suggested_question: Option<String>,
    /// 旧版浏览器插件一次提交多个问题
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

impl EvaluatePagesPayload {
    /// 合并单个问题和问题列表，每个问题一行
    pub fn combined_question(&self) -> String {
        self.suggested_question
            .iter()
            .chain(self.suggested_questions.iter())
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_request(
        self,
        max_urls: usize,
    ) -> Result<EvaluationRequest, RequestValidationError> {
        let question = self.combined_question();
        EvaluationRequest::new(self.urls, self.original_keywords, question, max_urls)
    }
}
