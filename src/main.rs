use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use html2pdf::cli::Cli;
use html2pdf::utils::logging;
use html2pdf::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = cli.apply_overrides(Config::load(cli.config.as_deref())?)?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let Some(request) = cli.request() else {
        tracing::error!("必须指定 --html 文件路径或 --batch 选项");
        Cli::command().print_help()?;
        return Ok(());
    };

    let cwd = std::env::current_dir().context("无法获取当前工作目录")?;
    App::initialize(config, cwd).run(&request).await
}
