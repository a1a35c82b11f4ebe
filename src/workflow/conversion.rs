//! 单个文档的转换流程 - 流程层
//!
//! 流程顺序：
//! 1. 读取源文档（文件）或接收字符串
//! 2. 预处理并写入临时文件
//! 3. 交给渲染器输出 PDF
//! 4. 删除临时文件（由 `PreparedDocument` 保证）

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{error, info};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::infrastructure::PdfRenderer;
use crate::models::SourceDocument;
use crate::services::DocumentPreparer;
use crate::utils::paths::{default_pdf_path, PDF_DIR_NAME};

/// 文档转换流程
///
/// - 不持有浏览器，只持有渲染能力
/// - 可以廉价 clone，批量任务之间共享同一个渲染器
pub struct Converter<R> {
    renderer: Arc<R>,
    preparer: DocumentPreparer,
}

impl<R> Clone for Converter<R> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            preparer: self.preparer.clone(),
        }
    }
}

impl<R: PdfRenderer> Converter<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer: Arc::new(renderer),
            preparer: DocumentPreparer::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// 转换 HTML 文件
    ///
    /// 路径必须为绝对路径。`pdf_path` 为空时输出到 `<输入的上上级目录>/pdf/<文件名>.pdf`
    pub async fn convert_html_file(
        &self,
        html_path: &Path,
        pdf_path: Option<&Path>,
    ) -> AppResult<PathBuf> {
        AppError::require_absolute(html_path)?;
        let pdf_path = match pdf_path {
            Some(path) => AppError::require_absolute(path)?.to_path_buf(),
            None => {
                let html_dir = html_path.parent().unwrap_or(html_path);
                default_pdf_path(html_path, &html_dir.join(PDF_DIR_NAME))
            }
        };
        info!(
            "📄 {} 文件转换为 {}",
            html_path.display(),
            pdf_path.display()
        );

        let result = async {
            let source = SourceDocument::read(html_path).await?;
            self.convert_source(&source, &pdf_path).await
        }
        .await;

        match result {
            Ok(()) => {
                info!("✅ PDF 生成完成: {}", pdf_path.display());
                Ok(pdf_path)
            }
            Err(AppError::NotFound { path }) => {
                error!("❌ 找不到文件: {}", path.display());
                Err(AppError::NotFound { path })
            }
            Err(e) => {
                error!("❌ 转换过程中发生错误: {}", e);
                Err(e)
            }
        }
    }

    /// 转换 HTML 字符串，临时文件写在输出目录下
    pub async fn convert_html_string(&self, html: &str, pdf_path: &Path) -> AppResult<PathBuf> {
        let source = SourceDocument::inline(html);
        match self.convert_source(&source, pdf_path).await {
            Ok(()) => {
                info!("✅ PDF 生成完成: {}", pdf_path.display());
                Ok(pdf_path.to_path_buf())
            }
            Err(e) => {
                error!("❌ 转换 HTML 字符串失败: {}", e);
                Err(e)
            }
        }
    }

    /// 直接打印网页，不做预处理
    pub async fn convert_url(&self, url: &Url, pdf_path: &Path) -> AppResult<PathBuf> {
        info!("🌐 {} 转换为 {}", url, pdf_path.display());
        let result = async {
            ensure_parent_dir(pdf_path).await?;
            self.renderer.render(url.as_str(), pdf_path).await
        }
        .await;

        match result {
            Ok(()) => {
                info!("✅ PDF 生成完成: {}", pdf_path.display());
                Ok(pdf_path.to_path_buf())
            }
            Err(e) => {
                error!("❌ 转换网页失败: {}", e);
                Err(e)
            }
        }
    }

    async fn convert_source(&self, source: &SourceDocument, pdf_path: &Path) -> AppResult<()> {
        let output_dir = ensure_parent_dir(pdf_path).await?;
        let prepared = self.preparer.write(source, &output_dir).await?;
        let url = prepared.file_url()?;
        self.renderer.render(url.as_str(), pdf_path).await
        // prepared 在此处释放，临时文件随之删除
    }
}

/// 创建输出文件的父目录并返回它，`path` 必须为绝对路径
async fn ensure_parent_dir(path: &Path) -> AppResult<PathBuf> {
    let parent = AppError::require_absolute(path)?
        .parent()
        .ok_or_else(|| {
            AppError::write_failed(path, io::Error::new(io::ErrorKind::InvalidInput, "缺少父目录"))
        })?
        .to_path_buf();
    fs::create_dir_all(&parent)
        .await
        .map_err(|e| AppError::write_failed(&parent, e))?;
    Ok(parent)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::RenderStage;
    use std::sync::Mutex;

    /// 测试用渲染器：检查临时文件存在，写出一个假的 PDF
    #[derive(Default)]
    pub(crate) struct FakeRenderer {
        /// 源文件名包含该字符串时渲染失败
        pub fail_on: Option<String>,
        pub rendered: Mutex<Vec<String>>,
    }

    impl FakeRenderer {
        pub(crate) fn failing_on(pattern: &str) -> Self {
            Self {
                fail_on: Some(pattern.to_string()),
                ..Default::default()
            }
        }
    }

    impl PdfRenderer for FakeRenderer {
        async fn render(&self, url: &str, output: &Path) -> AppResult<()> {
            self.rendered.lock().unwrap().push(url.to_string());

            if let Ok(parsed) = Url::parse(url) {
                if parsed.scheme() == "file" {
                    let temp = parsed.to_file_path().unwrap();
                    assert!(temp.exists(), "渲染时临时文件应存在: {}", temp.display());
                }
            }
            if let Some(pattern) = &self.fail_on {
                if url.contains(pattern.as_str()) {
                    return Err(AppError::render_failed(RenderStage::Export, "fake failure"));
                }
            }
            std::fs::write(output, b"%PDF-1.4\n%fake\n")
                .map_err(|e| AppError::write_failed(output, e))
        }
    }

    #[tokio::test]
    async fn test_convert_file_default_output_and_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let html_dir = root.path().join("html");
        std::fs::create_dir_all(&html_dir).unwrap();
        let html = html_dir.join("ch1.html");
        std::fs::write(&html, "<p>Hello</p>").unwrap();

        let converter = Converter::new(FakeRenderer::default());
        let pdf = converter.convert_html_file(&html, None).await.unwrap();

        // 默认输出在上上级目录的 pdf/ 下
        let expected = root.path().join("pdf").join("ch1.pdf");
        assert_eq!(pdf, expected);
        assert!(std::fs::metadata(&expected).unwrap().len() > 0);
        assert!(!html_dir.join("ch1_temp.html").exists());
        assert!(converter.renderer().rendered.lock().unwrap()[0].ends_with("ch1_temp.html"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found_without_output() {
        let root = tempfile::tempdir().unwrap();
        let pdf = root.path().join("out/missing.pdf");

        let converter = Converter::new(FakeRenderer::default());
        let err = converter
            .convert_html_file(&root.path().join("missing.html"), Some(&pdf))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!pdf.exists());
        assert!(converter.renderer().rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_temp_file_removed_when_render_fails() {
        let root = tempfile::tempdir().unwrap();
        let html = root.path().join("broken.html");
        std::fs::write(&html, "<p>x</p>").unwrap();
        let pdf = root.path().join("broken.pdf");

        let converter = Converter::new(FakeRenderer::failing_on("broken"));
        let err = converter.convert_html_file(&html, Some(&pdf)).await.unwrap_err();

        assert!(matches!(err, AppError::RenderFailed { .. }));
        assert!(!root.path().join("broken_temp.html").exists());
        assert!(!pdf.exists());
    }

    #[tokio::test]
    async fn test_convert_string_uses_output_dir_for_temp_file() {
        let root = tempfile::tempdir().unwrap();
        let pdf = root.path().join("nested/hello.pdf");

        let converter = Converter::new(FakeRenderer::default());
        let out = converter
            .convert_html_string("<p>Hello</p>", &pdf)
            .await
            .unwrap();

        assert_eq!(out, pdf);
        assert!(pdf.exists());
        assert!(!root.path().join("nested/temp_content.html").exists());
        assert!(converter.renderer().rendered.lock().unwrap()[0].ends_with("nested/temp_content.html"));
    }

    #[tokio::test]
    async fn test_relative_paths_rejected() {
        let root = tempfile::tempdir().unwrap();
        let converter = Converter::new(FakeRenderer::default());

        let err = converter
            .convert_html_file(Path::new("html/ch1.html"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RelativePath { .. }));

        let html = root.path().join("ch1.html");
        std::fs::write(&html, "<p>x</p>").unwrap();
        let err = converter
            .convert_html_file(&html, Some(Path::new("ch1.pdf")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RelativePath { .. }));

        let err = converter
            .convert_html_string("<p>x</p>", Path::new("out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RelativePath { .. }));

        assert!(converter.renderer().rendered.lock().unwrap().is_empty());
        assert!(!root.path().join("ch1_temp.html").exists());
    }

    #[tokio::test]
    async fn test_existing_temp_name_is_left_alone() {
        let root = tempfile::tempdir().unwrap();
        let html = root.path().join("notes.html");
        std::fs::write(&html, "<p>x</p>").unwrap();
        let user_file = root.path().join("notes_temp.html");
        std::fs::write(&user_file, "<p>내 메모</p>").unwrap();
        let pdf = root.path().join("notes.pdf");

        let converter = Converter::new(FakeRenderer::default());
        let err = converter.convert_html_file(&html, Some(&pdf)).await.unwrap_err();

        assert!(matches!(err, AppError::WriteFailed { .. }));
        assert_eq!(std::fs::read_to_string(&user_file).unwrap(), "<p>내 메모</p>");
        assert!(!pdf.exists());
    }

    #[tokio::test]
    async fn test_convert_url_skips_preparation() {
        let root = tempfile::tempdir().unwrap();
        let pdf = root.path().join("page.pdf");
        let url = Url::parse("https://example.com/page").unwrap();

        let converter = Converter::new(FakeRenderer::default());
        converter.convert_url(&url, &pdf).await.unwrap();

        assert_eq!(
            *converter.renderer().rendered.lock().unwrap(),
            vec!["https://example.com/page".to_string()]
        );
        assert!(pdf.exists());
    }
}
