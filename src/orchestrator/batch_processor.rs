//! 批量转换处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **扫描**：一次性列出源目录下（不递归）的全部 `*.html`
//! 2. **并发控制**：使用 Semaphore 限制同时运行的浏览器数量
//! 3. **结果汇总**：每个任务的成败单独记录，一个任务失败不影响其他任务
//!
//! 源目录不存在或没有 HTML 文件时不算错误，只输出提示。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::PdfRenderer;
use crate::models::source::TEMP_FILE_SUFFIX;
use crate::models::{BatchReport, BatchRun, ConversionJob, JobOutcome};
use crate::utils::logging;
use crate::workflow::Converter;

/// 批量转换处理器
pub struct BatchProcessor<R> {
    converter: Converter<R>,
    max_concurrent: usize,
}

impl<R: PdfRenderer + 'static> BatchProcessor<R> {
    pub fn new(converter: Converter<R>, max_concurrent: usize) -> Self {
        Self {
            converter,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 转换 `html_dir` 下的所有 HTML 文件到 `pdf_dir`
    pub async fn run(&self, html_dir: &Path, pdf_dir: &Path) -> AppResult<BatchRun> {
        if !fs::metadata(html_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            warn!("⚠️ 目录不存在: {}", html_dir.display());
            return Ok(BatchRun::MissingSource(html_dir.to_path_buf()));
        }

        fs::create_dir_all(pdf_dir)
            .await
            .map_err(|e| AppError::write_failed(pdf_dir, e))?;

        let html_files = discover_html_files(html_dir).await?;
        if html_files.is_empty() {
            warn!("⚠️ {} 目录中没有 HTML 文件", html_dir.display());
            return Ok(BatchRun::NoHtmlFiles(html_dir.to_path_buf()));
        }

        logging::log_batch_start(html_files.len(), html_dir, self.max_concurrent);

        let jobs: Vec<ConversionJob> = html_files
            .into_iter()
            .enumerate()
            .map(|(idx, path)| ConversionJob::new(idx + 1, path, pdf_dir))
            .collect();

        let outcomes = self.process_jobs(jobs).await?;
        let report = BatchReport {
            html_dir: html_dir.to_path_buf(),
            pdf_dir: pdf_dir.to_path_buf(),
            outcomes,
        };

        logging::print_final_stats(&report);
        Ok(BatchRun::Completed(report))
    }

    /// 并发执行所有任务，按任务编号返回结果
    async fn process_jobs(&self, jobs: Vec<ConversionJob>) -> AppResult<Vec<JobOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let total = jobs.len();
        let mut handles = Vec::with_capacity(total);

        for job in jobs {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Config(format!("并发控制失效: {}", e)))?;
            let converter = self.converter.clone();
            let task_job = job.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                info!("[任务 {}/{}] 开始转换", task_job.index, total);
                converter
                    .convert_html_file(&task_job.source, Some(&task_job.output))
                    .await
            });
            handles.push((job, handle));
        }

        // 等待所有任务完成
        let mut outcomes = Vec::with_capacity(total);
        for (job, handle) in handles {
            let result = match handle.await {
                Ok(Ok(path)) => Ok(path),
                // 转换流程内部已记录错误
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => {
                    error!("[任务 {}] 任务执行失败: {}", job.index, e);
                    Err(format!("任务执行失败: {}", e))
                }
            };
            outcomes.push(JobOutcome { job, result });
        }

        Ok(outcomes)
    }
}

/// 列出目录下（不递归）扩展名为 `.html` 的文件，按文件名排序
///
/// 符号链接按目标判断；隐藏文件和 `*_temp.html` 不参与转换。
pub async fn discover_html_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AppError::read_failed(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::read_failed(dir, e))?
    {
        let path = entry.path();
        if !is_convertible_name(&path) {
            continue;
        }
        let is_file = fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
        if is_file {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn is_convertible_name(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };
    !name.starts_with('.')
        && !name.ends_with(TEMP_FILE_SUFFIX)
        && path.extension().and_then(|s| s.to_str()) == Some("html")
}
