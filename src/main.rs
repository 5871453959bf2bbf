use std::path::PathBuf;

use anyhow::Result;
use page_evaluator::utils::logging;
use page_evaluator::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置：可选的 TOML 文件路径作为第一个参数，环境变量优先
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
