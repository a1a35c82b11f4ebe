//! 文档预处理服务 - 业务能力层
//!
//! 负责把源文档变成可以直接交给浏览器打印的完整 HTML：
//! 1. 文本替换（特殊字符、版权信息）
//! 2. 套上带打印样式表的 HTML 外壳
//! 3. 写入临时文件

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::error::AppResult;
use crate::models::SourceDocument;
use crate::services::prepared_file::PreparedDocument;

/// 内置打印样式表
pub const PRINT_STYLESHEET: &str = include_str!("print.css");

/// 特殊字符使用的 CSS 类名
pub const SPECIAL_CHARS_CLASS: &str = "special-chars";

/// 需要单独指定字体的字符
const SPECIAL_CHARS: [char; 2] = ['+', '©'];

/// 出现该版权标记时才处理结尾部分
pub const COPYRIGHT_MARKER: &str = "© 2025";

/// 结尾部分的替换规则，按顺序执行，原文不存在时跳过
const MARKER_REPLACEMENTS: [(&str, &str); 4] = [
    (
        "맺음말: AI 시대를 항해하는 여러분을 위한 안내",
        "<div class=\"final-content\">맺음말: AI 시대를 항해하는 여러분을 위한 안내",
    ),
    (
        "여러분의 성공적인 AI 여정을 기원하며,",
        "여러분의 성공적인 AI 여정을 기원하며,</div>",
    ),
    (
        "© 2025 [TeiNam",
        "<div id=\"copyright\">© 2025 [TeiNam",
    ),
    (
        "본 전자책의 내용 및 코드는 학습 목적으로 제공됩니다.",
        "본 전자책의 내용 및 코드는 학습 목적으로 제공됩니다.</div>",
    ),
];

/// 用 span 包裹每个特殊字符，其他字符保持不变
pub fn wrap_special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            out.push_str("<span class=\"");
            out.push_str(SPECIAL_CHARS_CLASS);
            out.push_str("\">");
            out.push(ch);
            out.push_str("</span>");
        } else {
            out.push(ch);
        }
    }
    out
}

/// 包含版权标记时，为结尾和版权信息加上容器
pub fn apply_marker_replacements(text: &str) -> Cow<'_, str> {
    if !text.contains(COPYRIGHT_MARKER) {
        return Cow::Borrowed(text);
    }

    let mut result = Cow::Borrowed(text);
    for (old, new) in MARKER_REPLACEMENTS {
        if result.contains(old) {
            result = Cow::Owned(result.replace(old, new));
        }
    }
    result
}

/// 完整的文本替换流程
///
/// 先在原文上匹配版权标记，再包裹特殊字符；
/// 反过来的话 `©` 已被拆开，标记永远匹配不到。
pub fn apply_substitutions(text: &str) -> String {
    wrap_special_chars(&apply_marker_replacements(text))
}

/// 文档预处理服务
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentPreparer;

impl DocumentPreparer {
    pub fn new() -> Self {
        Self
    }

    /// 生成完整的 HTML 文档
    pub fn prepare(&self, source: &SourceDocument) -> String {
        let body = if source.wants_substitution() {
            Cow::Owned(apply_substitutions(&source.content))
        } else {
            Cow::Borrowed(source.content.as_str())
        };
        self.assemble(&body)
    }

    /// 套上 HTML 外壳
    pub fn assemble(&self, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            PRINT_STYLESHEET, body
        )
    }

    /// 预处理并写入临时文件
    ///
    /// 返回的 [`PreparedDocument`] 被丢弃时删除临时文件。
    pub async fn write(
        &self,
        source: &SourceDocument,
        output_dir: &Path,
    ) -> AppResult<PreparedDocument> {
        let temp_path = source.temp_path(output_dir);
        debug!("预处理 {} → {}", source.label(), temp_path.display());
        PreparedDocument::create(temp_path, self.prepare(source)).await
    }
}
