use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::{Stream, StreamExt};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, RenderStage};

/// 无头浏览器启动参数
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
    pub request_timeout: Duration,
}

impl From<&Config> for BrowserSettings {
    fn from(config: &Config) -> Self {
        Self {
            executable: config.browser_executable.clone(),
            no_sandbox: config.no_sandbox,
            request_timeout: config.request_timeout(),
        }
    }
}

/// 一次性的浏览器实例
///
/// 持有浏览器进程、事件处理任务和独立的用户数据目录，
/// 通过 [`BrowserSession::close`] 释放。
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    // 多个实例并发启动时不能共用同一个 profile 目录
    _profile_dir: TempDir,
}

/// 启动无头浏览器
pub async fn launch_headless_browser(settings: &BrowserSettings) -> AppResult<BrowserSession> {
    debug!("🚀 启动无头浏览器...");

    let profile_dir = tempfile::Builder::new()
        .prefix("html2pdf-profile-")
        .tempdir()
        .map_err(|e| AppError::render_failed(RenderStage::Launch, e))?;

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .user_data_dir(profile_dir.path())
        .request_timeout(settings.request_timeout)
        .args(vec![
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--font-render-hinting=none",
        ]);
    if settings.no_sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(executable) = &settings.executable {
        debug!("使用浏览器: {}", executable.display());
        builder = builder.chrome_executable(executable);
    }

    let config = builder
        .build()
        .map_err(|e| AppError::render_failed(RenderStage::Launch, e))?;

    let (browser, handler) = Browser::launch(config)
        .await
        .map_err(|e| AppError::render_failed(RenderStage::Launch, e))?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件；单条消息解析失败不能中断事件循环
    let handler_task = tokio::spawn(drain_events(handler));

    Ok(BrowserSession {
        browser,
        handler_task,
        _profile_dir: profile_dir,
    })
}

/// 消费浏览器事件直到连接关闭
async fn drain_events<S, E>(mut events: S)
where
    S: Stream<Item = Result<(), E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            debug!("浏览器事件处理出错，继续: {}", e);
        }
    }
}

impl BrowserSession {
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// 关闭浏览器并等待进程退出
    pub async fn close(mut self) -> AppResult<()> {
        let closed = self.browser.close().await;
        if let Err(e) = &closed {
            warn!("正常关闭浏览器失败，强制结束进程: {}", e);
            let _ = self.browser.kill().await;
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        let _ = self.handler_task.await;
        debug!("无头浏览器已关闭");

        closed
            .map(|_| ())
            .map_err(|e| AppError::render_failed(RenderStage::Shutdown, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_loop_survives_errors() {
        let events = futures::stream::iter(vec![
            Ok(()),
            Err("data did not match any variant of untagged enum Message"),
            Ok(()),
            Err("invalid type"),
            Ok(()),
        ]);
        let mut events = events.fuse();

        drain_events(&mut events).await;

        // 所有事件（包括出错之后的）都被消费
        assert!(events.next().await.is_none());
    }
}
