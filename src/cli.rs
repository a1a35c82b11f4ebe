//! 命令行参数

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::error::AppResult;
use crate::utils::paths::{RawRequest, HTML_DIR_NAME};

#[derive(Debug, Parser)]
#[command(name = "html2pdf", version, about = "把 HTML 文件转换为 PDF")]
pub struct Cli {
    /// 输入的 HTML 文件路径或网页地址
    #[arg(long, value_name = "PATH_OR_URL")]
    pub html: Option<String>,

    /// 输出 PDF 路径（相对路径以 pdf/ 为基准）
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// 批量转换目录下的所有 HTML 文件
    #[arg(long)]
    pub batch: bool,

    /// 批量模式的 HTML 目录
    #[arg(long, value_name = "DIR", default_value = HTML_DIR_NAME)]
    pub html_dir: PathBuf,

    /// 批量模式的 PDF 输出目录（默认: <root>/pdf）
    #[arg(long, value_name = "DIR")]
    pub pdf_dir: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(long, value_name = "FILE", env = "HTML2PDF_CONFIG")]
    pub config: Option<PathBuf>,

    /// 批量模式下同时转换的文件数量
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 选择运行模式，`--batch` 优先；两者都没有时返回 `None`
    pub fn request(&self) -> Option<RawRequest> {
        if self.batch {
            return Some(RawRequest::Batch {
                html_dir: self.html_dir.clone(),
                pdf_dir: self.pdf_dir.clone(),
            });
        }
        self.html.as_ref().map(|html| RawRequest::Single {
            html: html.clone(),
            out: self.out.clone(),
        })
    }

    /// 命令行参数覆盖配置
    pub fn apply_overrides(&self, mut config: Config) -> AppResult<Config> {
        if let Some(jobs) = self.jobs {
            config.max_concurrent_jobs = jobs;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        config.validate()
    }
}
