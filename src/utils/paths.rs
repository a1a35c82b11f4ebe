//! 路径解析
//!
//! 所有默认路径规则集中在这里，基准目录由调用方显式传入，
//! 不读取进程的当前目录。

use std::path::{Path, PathBuf};

use url::Url;

/// 固定的输入子目录名
pub const HTML_DIR_NAME: &str = "html";
/// 固定的输出子目录名
pub const PDF_DIR_NAME: &str = "pdf";

/// 命令行给出的原始请求（尚未解析路径）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRequest {
    Single {
        html: String,
        out: Option<PathBuf>,
    },
    Batch {
        html_dir: PathBuf,
        pdf_dir: Option<PathBuf>,
    },
}

/// 单文件模式的输入：本地文件或网页地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlInput {
    File(PathBuf),
    Url(Url),
}

/// 解析后的请求，所有路径均为绝对路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRequest {
    Single { input: HtmlInput, output: PathBuf },
    Batch { html_dir: PathBuf, pdf_dir: PathBuf },
}

/// 路径解析的基准目录
#[derive(Debug, Clone)]
pub struct PathContext {
    /// 项目根目录，html/ 与 pdf/ 位于其下
    pub root_dir: PathBuf,
    /// 调用方的工作目录，用于判断相对输入是否“按原样存在”
    pub cwd: PathBuf,
}

impl PathContext {
    pub fn new(root_dir: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            cwd: cwd.into(),
        }
    }

    pub fn html_base(&self) -> PathBuf {
        self.root_dir.join(HTML_DIR_NAME)
    }

    pub fn pdf_base(&self) -> PathBuf {
        self.root_dir.join(PDF_DIR_NAME)
    }

    /// 解析整个请求
    ///
    /// `exists` 只用于判断相对的 `--html` 路径在工作目录下是否存在。
    pub fn resolve(&self, request: &RawRequest, exists: impl Fn(&Path) -> bool) -> ResolvedRequest {
        match request {
            RawRequest::Single { html, out } => {
                let input = self.resolve_html_input(html, exists);
                let output = self.resolve_single_output(out.as_deref(), &input);
                ResolvedRequest::Single { input, output }
            }
            RawRequest::Batch { html_dir, pdf_dir } => ResolvedRequest::Batch {
                html_dir: self.absolutize_under_root(html_dir),
                pdf_dir: pdf_dir
                    .as_deref()
                    .map(|dir| self.absolutize_under_root(dir))
                    .unwrap_or_else(|| self.pdf_base()),
            },
        }
    }

    /// `--html`：URL 原样保留；相对路径先在工作目录下查找，找不到再落到 root/html/
    pub fn resolve_html_input(&self, raw: &str, exists: impl Fn(&Path) -> bool) -> HtmlInput {
        if let Some(url) = parse_web_url(raw) {
            return HtmlInput::Url(url);
        }

        let path = Path::new(raw);
        if path.is_absolute() {
            return HtmlInput::File(path.to_path_buf());
        }

        let in_cwd = self.cwd.join(path);
        if exists(&in_cwd) {
            HtmlInput::File(in_cwd)
        } else {
            HtmlInput::File(self.html_base().join(path))
        }
    }

    /// `--out`：相对路径落到 root/pdf/；缺省时按输入推导
    pub fn resolve_single_output(&self, out: Option<&Path>, input: &HtmlInput) -> PathBuf {
        match (out, input) {
            (Some(out), _) if out.is_absolute() => out.to_path_buf(),
            (Some(out), _) => self.pdf_base().join(out),
            (None, HtmlInput::File(html)) => default_pdf_path(html, &self.pdf_base()),
            (None, HtmlInput::Url(url)) => self.pdf_base().join(format!("{}.pdf", url_stem(url))),
        }
    }

    fn absolutize_under_root(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root_dir.join(dir)
        }
    }
}

/// 缺省输出路径：`<输入的上上级目录>/pdf/<文件名>.pdf`
///
/// 输入没有上上级目录时退回到 `fallback_dir`。
pub fn default_pdf_path(html: &Path, fallback_dir: &Path) -> PathBuf {
    let file_name = format!("{}.pdf", file_stem(html));
    match html.parent().and_then(Path::parent) {
        Some(grandparent) => grandparent.join(PDF_DIR_NAME).join(file_name),
        None => fallback_dir.join(file_name),
    }
}

/// 批量模式下每个源文件对应的输出路径
pub fn batch_pdf_path(html: &Path, pdf_dir: &Path) -> PathBuf {
    pdf_dir.join(format!("{}.pdf", file_stem(html)))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn parse_web_url(raw: &str) -> Option<Url> {
    if !raw.starts_with("http") {
        return None;
    }
    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn url_stem(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| file_stem(Path::new(segment)))
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "output".to_string())
}
