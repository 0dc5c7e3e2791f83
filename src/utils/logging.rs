//! 日志工具模块
//!
//! 提供日志初始化、运行日志文件和格式化输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错
///
/// # 参数
/// - `verbose`: 是否输出详细日志
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `config`: 本次运行的配置，写入文件头
pub fn init_log_file(log_file_path: &str, config: &Config) -> AppResult<()> {
    let log_header = format!(
        "{}\nQnAfy 运行日志 - {}\n{}\n输入: {}\n输出: {}\n模型: {}\n风格: {}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60),
        config.input_pdf,
        config.output_pdf,
        config.model,
        config.answer_style,
    );
    fs::write(log_file_path, log_header).map_err(|e| AppError::file(log_file_path, e))?;
    Ok(())
}

/// 向运行日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> AppResult<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| AppError::file(log_file_path, e))?;
    writeln!(file, "{}", line).map_err(|e| AppError::file(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    let concurrency = match config.concurrency_limit() {
        Some(n) => n.to_string(),
        None => "不限".to_string(),
    };
    info!("{}", "=".repeat(60));
    info!("🚀 QnAfy 启动");
    info!("🤖 模型: {} | 风格: {}", config.model, config.answer_style.label());
    info!("📊 最大并发数: {} | 最大重试: {}", concurrency, config.max_retries);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `document_id`: 文档标识
/// - `total`: 题目总数
pub fn log_batch_start(document_id: &str, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始作答文档 {}", truncate_text(document_id, 12));
    info!("📄 题目数: {}", total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `success`: 成功作答数量
/// - `total`: 题目总数
pub fn log_batch_complete(success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 作答完成: 成功 {}/{}", success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败或跳过数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败或跳过: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
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
