//! 日志工具模块
//!
//! 提供日志初始化以及批量转换的进度输出

use std::path::Path;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::models::BatchReport;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。
/// 重复调用不会报错（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(mode: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 HTML → PDF 转换启动 - {}", mode);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 当前本地时间，用于批量任务的开始和结束横幅
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 记录批量任务开始
pub fn log_batch_start(total: usize, html_dir: &Path, max_concurrent: usize) {
    info!("✓ 在 {} 中找到 {} 个 HTML 文件", html_dir.display(), total);
    info!("📋 共 {} 个文件，最多同时转换 {} 个", total, max_concurrent);
    info!("开始时间: {}", timestamp());
}

/// 打印最终统计信息
pub fn print_final_stats(report: &BatchReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部转换完成统计");
    info!("完成时间: {}", timestamp());
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.success_count(), report.total());
    info!("❌ 失败: {}", report.failure_count());
    for outcome in report.failed() {
        if let Err(message) = &outcome.result {
            error!("   {} → {}", outcome.job.source.display(), message);
        }
    }
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", report.pdf_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
