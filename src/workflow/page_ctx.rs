//! 页面处理上下文
//!
//! 封装"我正在处理这一批的第几个 URL"这一信息

use std::fmt::Display;

/// 页面处理上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCtx {
    /// 原始 URL，结果按它回传给调用方
    pub url: String,

    /// 在批次中的位置（从1开始，仅用于日志显示）
    pub index: usize,

    /// 批次大小
    pub total: usize,
}

impl PageCtx {
    pub fn new(url: impl Into<String>, index: usize, total: usize) -> Self {
        Self {
            url: url.into(),
            index,
            total,
        }
    }
}

impl Display for PageCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[页面 {}/{} {}]", self.index, self.total, self.url)
    }
}
