//! # html2pdf
//!
//! 用无头浏览器把 HTML 文档（文件、字符串或整个目录）转换为 PDF
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 启动和关闭一次性的无头浏览器
//! - `infrastructure/` - `PdfRenderer`：把页面打印成 PDF
//!
//! ### ② 业务能力层（Services）
//! - `DocumentPreparer` - 文本替换 + 打印样式表
//! - `PreparedDocument` - 临时 HTML 文件，离开作用域即删除
//!
//! ### ③ 流程层（Workflow）
//! - `Converter` - 单个文档：读取 → 预处理 → 渲染 → 清理
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchProcessor` - 目录批量转换，限制并发并逐个汇总结果

pub mod app;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, RenderStage};
pub use infrastructure::{ChromeRenderer, PdfRenderer, PrintOptions};
pub use models::{BatchReport, BatchRun, ConversionJob, JobOutcome, SourceDocument};
pub use orchestrator::BatchProcessor;
pub use services::{DocumentPreparer, PreparedDocument};
pub use workflow::Converter;
