use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::orchestrator::BatchEvaluator;
use crate::services::{HttpPageFetcher, LlmService};
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    config: Config,
    state: AppState,
}

impl App {
    /// 初始化应用：创建抓取器和模型客户端并组装评估器
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        if config.llm_api_key.is_empty() {
            tracing::warn!("⚠️ 未设置 LLM_API_KEY，模型调用可能失败");
        }

        let fetcher = HttpPageFetcher::new(&config).context("创建 HTTP 客户端失败")?;
        let backend = LlmService::new(&config);
        let evaluator = BatchEvaluator::from_config(&config, Arc::new(fetcher), Arc::new(backend));
        let state = AppState::new(evaluator, config.max_urls_per_batch);

        Ok(Self { config, state })
    }

    /// 运行 HTTP 服务，直到收到 Ctrl-C
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .with_context(|| format!("无效的监听地址: {}", self.config.socket_addr()))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("无法监听 {}", addr))?;
        info!("✓ 服务已启动: http://{}", addr);

        axum::serve(listener, api::create_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP 服务异常退出")?;

        info!("服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("收到退出信号，正在停止服务...");
}
