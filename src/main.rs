use anyhow::{Context, Result};
use qnafy::utils::logging;
use qnafy::{run_blocking, App, Config};

fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("配置加载失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let mut app = App::initialize(config)?;
    let stats = run_blocking(async move { app.run().await })??;

    if stats.total > 0 && stats.answered == 0 {
        anyhow::bail!("所有题目均未能作答");
    }

    Ok(())
}
