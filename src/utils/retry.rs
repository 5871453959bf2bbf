//! 有界重试
//!
//! "最多尝试 N 次，只保留最后一次错误" 的通用实现，
//! 与被包装的操作解耦，方便单独测试。

use std::future::Future;

use tracing::warn;

/// 重试策略：最多尝试 `max_attempts` 次（含第一次），失败后立即重新提交
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

/// 重试耗尽或遇到不可重试错误
#[derive(Debug)]
pub struct RetryError<E> {
    /// 实际执行次数
    pub attempts: u32,
    /// 最后一次的错误
    pub last: E,
}

impl RetryPolicy {
    /// `max_attempts` 为 0 时按 1 处理
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 执行 `op`，直到成功、次数用尽或 `is_retryable` 返回 false
    ///
    /// `op` 接收当前尝试序号（从 1 开始）。
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !is_retryable(&err) {
                        return Err(RetryError {
                            attempts: attempt,
                            last: err,
                        });
                    }
                    warn!(
                        "第 {}/{} 次尝试失败，立即重试: {}",
                        attempt, self.max_attempts, err
                    );
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
