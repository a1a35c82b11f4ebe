use std::path::{Path, PathBuf};

use crate::utils::paths::batch_pdf_path;

/// 转换任务：一个源文件对应一个输出 PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// 任务编号（从 1 开始，仅用于日志）
    pub index: usize,
    pub source: PathBuf,
    pub output: PathBuf,
}

impl ConversionJob {
    pub fn new(index: usize, source: PathBuf, pdf_dir: &Path) -> Self {
        let output = batch_pdf_path(&source, pdf_dir);
        Self {
            index,
            source,
            output,
        }
    }
}

/// 单个任务的结果，失败时保存错误信息
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job: ConversionJob,
    pub result: Result<PathBuf, String>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 批量转换报告
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub html_dir: PathBuf,
    pub pdf_dir: PathBuf,
    /// 按任务编号排序
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }
}

/// 批量转换的最终状态
#[derive(Debug, Clone)]
pub enum BatchRun {
    /// 源目录不存在（不是错误）
    MissingSource(PathBuf),
    /// 源目录中没有 HTML 文件（不是错误）
    NoHtmlFiles(PathBuf),
    /// 已执行全部任务
    Completed(BatchReport),
}

impl BatchRun {
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            BatchRun::Completed(report) => Some(report),
            _ => None,
        }
    }
}
