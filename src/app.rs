use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::browser::BrowserSettings;
use crate::config::Config;
use crate::infrastructure::ChromeRenderer;
use crate::models::BatchRun;
use crate::orchestrator::BatchProcessor;
use crate::utils::logging;
use crate::utils::paths::{HtmlInput, PathContext, RawRequest, ResolvedRequest};
use crate::workflow::Converter;

/// 应用主结构
pub struct App {
    config: Config,
    paths: PathContext,
    converter: Converter<ChromeRenderer>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config, cwd: PathBuf) -> Self {
        let root_dir = config.resolve_root_dir(&cwd);
        let renderer = ChromeRenderer::new(BrowserSettings::from(&config));

        Self {
            paths: PathContext::new(root_dir, cwd),
            converter: Converter::new(renderer),
            config,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self, request: &RawRequest) -> Result<()> {
        let resolved = self.paths.resolve(request, |path| path.exists());

        match resolved {
            ResolvedRequest::Single { input, output } => {
                logging::log_startup("单文件模式", 1);
                match input {
                    HtmlInput::File(html) => {
                        self.converter.convert_html_file(&html, Some(&output)).await?;
                    }
                    HtmlInput::Url(url) => {
                        self.converter.convert_url(&url, &output).await?;
                    }
                }
            }
            ResolvedRequest::Batch { html_dir, pdf_dir } => {
                logging::log_startup("批量模式", self.config.max_concurrent_jobs);
                let processor =
                    BatchProcessor::new(self.converter.clone(), self.config.max_concurrent_jobs);

                match processor.run(&html_dir, &pdf_dir).await? {
                    BatchRun::MissingSource(dir) => {
                        warn!("⚠️ 没有可转换的文件（目录不存在: {}），程序结束", dir.display());
                    }
                    BatchRun::NoHtmlFiles(dir) => {
                        warn!("⚠️ {} 中没有 HTML 文件，程序结束", dir.display());
                    }
                    BatchRun::Completed(report) => {
                        if !report.is_clean() {
                            bail!(
                                "{} 个文件转换失败（共 {} 个）",
                                report.failure_count(),
                                report.total()
                            );
                        }
                        info!(
                            "🎉 所有 HTML 文件转换完成，结果保存在 {}",
                            report.pdf_dir.display()
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
