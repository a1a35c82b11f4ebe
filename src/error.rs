use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// HTML 文件不存在
    #[error("找不到文件: {}", path.display())]
    NotFound { path: PathBuf },

    /// 读取文件失败（包括非 UTF-8 内容）
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 写入临时文件、输出文件或目录失败
    #[error("写入文件失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 浏览器启动、导航或 PDF 导出失败
    #[error("渲染失败 [{stage}]: {source}")]
    RenderFailed {
        stage: RenderStage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 传入库函数的路径不是绝对路径
    #[error("路径必须为绝对路径: {}", path.display())]
    RelativePath { path: PathBuf },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// 渲染过程所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Launch,
    Navigate,
    Export,
    Shutdown,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStage::Launch => "启动浏览器",
            RenderStage::Navigate => "加载页面",
            RenderStage::Export => "导出 PDF",
            RenderStage::Shutdown => "关闭浏览器",
        };
        f.write_str(name)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误，`NotFound` 单独归类
    pub fn read_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            AppError::NotFound { path }
        } else {
            AppError::ReadFailed { path, source }
        }
    }

    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// 创建渲染错误
    pub fn render_failed(
        stage: RenderStage,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::RenderFailed {
            stage,
            source: source.into(),
        }
    }

    /// 要求绝对路径，库内不依赖进程的当前目录
    pub fn require_absolute(path: &std::path::Path) -> AppResult<&std::path::Path> {
        if path.is_absolute() {
            Ok(path)
        } else {
            Err(AppError::RelativePath {
                path: path.to_path_buf(),
            })
        }
    }

    /// 是否为文件不存在错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
