use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{AppError, AppResult};

/// 字符串输入在输出目录下使用的临时文件名
pub const INLINE_TEMP_FILE_NAME: &str = "temp_content.html";
/// 文件输入的临时文件后缀（`<stem>_temp.html`）
pub const TEMP_FILE_SUFFIX: &str = "_temp.html";

/// 源文档的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// 从磁盘读取
    File(PathBuf),
    /// 调用方直接提供的 HTML 字符串
    Inline,
}

/// 源文档：读取后不再修改的 UTF-8 HTML 内容
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub content: String,
    pub origin: SourceOrigin,
}

impl SourceDocument {
    /// 从文件读取源文档
    ///
    /// 文件不存在时返回 `NotFound`，内容不是合法 UTF-8 时返回 `ReadFailed`
    pub async fn read(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AppError::read_failed(path, e))?;

        Ok(Self {
            content,
            origin: SourceOrigin::File(path.to_path_buf()),
        })
    }

    pub fn inline(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: SourceOrigin::Inline,
        }
    }

    /// 用于日志显示的来源描述
    pub fn label(&self) -> Cow<'_, str> {
        match &self.origin {
            SourceOrigin::File(path) => path.to_string_lossy(),
            SourceOrigin::Inline => Cow::Borrowed("<HTML 字符串>"),
        }
    }

    /// 是否需要做文本替换
    ///
    /// 只对“生成的内容”替换：字符串输入，或扩展名不是 `.html` 的文件。
    pub fn wants_substitution(&self) -> bool {
        match &self.origin {
            SourceOrigin::Inline => true,
            SourceOrigin::File(path) => {
                let raw = path.to_string_lossy();
                !raw.ends_with(".html") && !raw.starts_with("http")
            }
        }
    }

    /// 预处理后文档的临时路径
    ///
    /// 文件输入放在源文件旁（`<stem>_temp.html`），使 fonts/ 等相对资源仍然可用；
    /// 字符串输入放在 `output_dir` 下的固定文件名。
    pub fn temp_path(&self, output_dir: &Path) -> PathBuf {
        match &self.origin {
            SourceOrigin::File(path) => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                path.with_file_name(format!("{stem}{TEMP_FILE_SUFFIX}"))
            }
            SourceOrigin::Inline => output_dir.join(INLINE_TEMP_FILE_NAME),
        }
    }
}
