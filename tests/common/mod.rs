#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use page_evaluator::error::BackendError;
use page_evaluator::models::{FetchedPage, OutputSchema};
use page_evaluator::services::{GenerationBackend, PageSource};
use page_evaluator::workflow::prompt::EMPTY_PAGE_NOTE;

/// 按 URL 返回预设页面，未登记的 URL 视为抓取失败
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new(pages: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        })
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for StubFetcher {
    async fn fetch_page(&self, url: &str) -> FetchedPage {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(body) => FetchedPage::new(url, body.clone()),
            None => FetchedPage::empty(url),
        }
    }
}

/// 模型对某个 URL 的表现
#[derive(Debug, Clone)]
pub enum Behavior {
    /// 返回合法 JSON，总合评价为给定分数
    Score(u8),
    /// 总是调用失败
    Fail,
    /// 总是返回超出范围的分数
    OutOfRange,
}

/// 根据 prompt 中的 URL 决定返回内容，并记录并发数
pub struct StubBackend {
    behaviors: HashMap<String, Behavior>,
    fail_on_empty_page: bool,
    delay: Duration,
    calls: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn new(behaviors: &[(&str, Behavior)]) -> Self {
        Self {
            behaviors: behaviors
                .iter()
                .map(|(url, b)| (url.to_string(), b.clone()))
                .collect(),
            fail_on_empty_page: false,
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 页面正文为空时调用失败
    pub fn failing_on_empty_page(mut self) -> Self {
        self.fail_on_empty_page = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn behavior_for(&self, prompt: &str) -> Behavior {
        self.behaviors
            .iter()
            .find(|(url, _)| prompt.contains(&format!("## ページのURL\n{}\n", url)))
            .map(|(_, b)| b.clone())
            .unwrap_or(Behavior::Fail)
    }
}

pub fn evaluation_json(overall: u8) -> String {
    format!(
        r#"{{"信頼性": {overall}, "有用性": {overall}, "最終更新日": null, "総合評価": {overall}, "理由": "score {overall}"}}"#
    )
}

#[async_trait]
impl GenerationBackend for StubBackend {
    async fn complete(&self, prompt: &str, _schema: &OutputSchema) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failed = || BackendError::ApiCallFailed {
            model: "stub".to_string(),
            message: "unavailable".to_string(),
        };

        if self.fail_on_empty_page && prompt.contains(EMPTY_PAGE_NOTE) {
            return Err(failed());
        }

        match self.behavior_for(prompt) {
            Behavior::Score(n) => Ok(evaluation_json(n)),
            Behavior::Fail => Err(failed()),
            Behavior::OutOfRange => Ok(evaluation_json(11)),
        }
    }
}

pub fn html(body: &str) -> String {
    format!(
        "<html><head><script>track()</script></head><body><p>{}</p></body></html>",
        body
    )
}
