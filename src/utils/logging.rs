/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// 默认级别为 `info`，可通过 `RUST_LOG` 覆盖。重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 页面评估服务启动");
    info!("🌐 监听地址: {}", config.socket_addr());
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!(
        "📊 每批最多 {} 个 URL，最大并发数: {}",
        config.max_urls_per_batch, config.max_concurrent_evaluations
    );
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `scored`: 成功评分数量
/// - `total`: 批次 URL 总数
pub fn log_batch_complete(scored: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!("✓ 批次完成: 评分成功 {}/{}", scored, total);
    if scored < total {
        info!("⚠️ 丢弃 {} 个无法评分的页面", total - scored);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
