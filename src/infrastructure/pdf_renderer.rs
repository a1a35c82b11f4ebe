//! PDF 渲染器 - 基础设施层
//!
//! 持有浏览器这一稀缺资源，只暴露“把页面打印成 PDF”的能力：
//! 不认识源文档，也不负责临时文件。

use std::future::Future;
use std::path::Path;

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use tracing::{debug, warn};

use crate::browser::{launch_headless_browser, BrowserSettings};
use crate::error::{AppError, AppResult, RenderStage};

const CM_PER_INCH: f64 = 2.54;

/// 打印参数（固定为 A4，上下 1.5cm、左右 1.2cm）
#[derive(Debug, Clone, PartialEq)]
pub struct PrintOptions {
    pub paper_width_cm: f64,
    pub paper_height_cm: f64,
    pub margin_vertical_cm: f64,
    pub margin_horizontal_cm: f64,
    pub print_background: bool,
    /// 文档中的 `@page` 规则优先于这里的纸张和边距
    pub prefer_css_page_size: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            paper_width_cm: 21.0,
            paper_height_cm: 29.7,
            margin_vertical_cm: 1.5,
            margin_horizontal_cm: 1.2,
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

impl PrintOptions {
    /// 转换为 CDP 参数（CDP 使用英寸）
    pub fn to_cdp_params(&self) -> PrintToPdfParams {
        let inches = |cm: f64| cm / CM_PER_INCH;
        PrintToPdfParams {
            paper_width: Some(inches(self.paper_width_cm)),
            paper_height: Some(inches(self.paper_height_cm)),
            margin_top: Some(inches(self.margin_vertical_cm)),
            margin_bottom: Some(inches(self.margin_vertical_cm)),
            margin_left: Some(inches(self.margin_horizontal_cm)),
            margin_right: Some(inches(self.margin_horizontal_cm)),
            print_background: Some(self.print_background),
            prefer_css_page_size: Some(self.prefer_css_page_size),
            ..Default::default()
        }
    }
}

/// 把一个页面地址渲染为 PDF 文件
pub trait PdfRenderer: Send + Sync {
    /// `url` 为 `file://` 或 `http(s)://` 地址，结果写入 `output`
    fn render(&self, url: &str, output: &Path) -> impl Future<Output = AppResult<()>> + Send;
}

/// 基于 Chromium 的渲染器
///
/// 每次调用启动一个独立的浏览器实例，渲染结束后无论成败都会关闭。
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    settings: BrowserSettings,
    options: PrintOptions,
}

impl ChromeRenderer {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            options: PrintOptions::default(),
        }
    }

    async fn print_page(&self, page: &Page, output: &Path) -> AppResult<()> {
        page.wait_for_navigation()
            .await
            .map_err(|e| AppError::render_failed(RenderStage::Navigate, e))?;

        // 等待 Web 字体加载完成，失败时直接打印
        if let Err(e) = page.evaluate("document.fonts.ready.then(() => true)").await {
            warn!("等待字体加载失败，继续导出: {}", e);
        }

        page.save_pdf(self.options.to_cdp_params(), output)
            .await
            .map_err(|e| AppError::render_failed(RenderStage::Export, e))?;
        Ok(())
    }
}

impl PdfRenderer for ChromeRenderer {
    async fn render(&self, url: &str, output: &Path) -> AppResult<()> {
        let session = launch_headless_browser(&self.settings).await?;

        debug!("加载页面: {}", url);
        let result = match session.browser().new_page(url).await {
            Ok(page) => self.print_page(&page, output).await,
            Err(e) => Err(AppError::render_failed(RenderStage::Navigate, e)),
        };

        // 浏览器必须释放；渲染错误优先于关闭错误，由调用方统一记录
        let closed = session.close().await;
        result.and(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-3).unwrap_or(false)
    }

    #[test]
    fn test_a4_params_in_inches() {
        let params = PrintOptions::default().to_cdp_params();

        assert!(approx(params.paper_width, 8.268));
        assert!(approx(params.paper_height, 11.693));
        assert!(approx(params.margin_top, 0.591));
        assert!(approx(params.margin_bottom, 0.591));
        assert!(approx(params.margin_left, 0.472));
        assert!(approx(params.margin_right, 0.472));
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.prefer_css_page_size, Some(true));
    }
}
