//! 编排层（Orchestration Layer）
//!
//! ```text
//! batch_processor (处理目录下的全部文件)
//!     ↓
//! workflow::Converter (处理单个文档)
//!     ↓
//! services (能力层：预处理 / 临时文件)
//!     ↓
//! infrastructure (基础设施：PdfRenderer)
//! ```

pub mod batch_processor;

pub use batch_processor::{discover_html_files, BatchProcessor};
