//! 预处理后的临时 HTML 文件
//!
//! 创建后由 [`PreparedDocument`] 持有，离开作用域时删除（成功、失败、panic 都一样）。
//! 只删除自己创建的文件：目标路径已存在时直接报错，不覆盖。

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use url::Url;

use crate::error::{AppError, AppResult};

#[derive(Debug)]
pub struct PreparedDocument {
    path: PathBuf,
}

impl PreparedDocument {
    /// 写入临时文件，必要时创建父目录
    ///
    /// `path` 必须是绝对路径；已存在同名文件时返回 `WriteFailed`（`AlreadyExists`）。
    pub async fn create(path: PathBuf, html: String) -> AppResult<Self> {
        AppError::require_absolute(&path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::write_failed(parent, e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| AppError::write_failed(&path, e))?;

        Self::fill(path, file, html.as_bytes()).await
    }

    /// 文件已创建后写入内容；写入失败时 guard 已存在，文件随之删除
    async fn fill<W: AsyncWrite + Unpin>(
        path: PathBuf,
        mut writer: W,
        bytes: &[u8],
    ) -> AppResult<Self> {
        let guard = Self { path };
        writer
            .write_all(bytes)
            .await
            .map_err(|e| AppError::write_failed(&guard.path, e))?;
        writer
            .flush()
            .await
            .map_err(|e| AppError::write_failed(&guard.path, e))?;
        debug!("临时文件已写入: {}", guard.path.display());

        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 供浏览器加载的 `file://` 地址
    pub fn file_url(&self) -> AppResult<Url> {
        Url::from_file_path(&self.path).map_err(|_| AppError::RelativePath {
            path: self.path.clone(),
        })
    }
}

impl Drop for PreparedDocument {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("🗑️ 临时文件已删除: {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("⚠️ 删除临时文件失败 {}: {}", self.path.display(), e),
        }
    }
}
