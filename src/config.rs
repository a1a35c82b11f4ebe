use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件 → 环境变量，命令行参数最后覆盖
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 批量模式下同时运行的转换任务数量
    pub max_concurrent_jobs: usize,
    /// Chrome / Chromium 可执行文件路径，未设置时自动检测
    pub browser_executable: Option<PathBuf>,
    /// 是否以 --no-sandbox 启动浏览器
    pub no_sandbox: bool,
    /// CDP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 项目根目录（html/、pdf/ 的基准目录），未设置时使用可执行文件所在目录
    pub root_dir: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            browser_executable: None,
            no_sandbox: true,
            request_timeout_secs: 30,
            root_dir: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从 TOML 文件加载配置（文件不存在时报错），再叠加环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.merge_env(|name| std::env::var(name).ok())
            .validate()
    }

    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::read_failed(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用环境变量覆盖配置，`lookup` 便于测试时注入
    pub fn merge_env(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_concurrent_jobs: lookup("MAX_CONCURRENT_JOBS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.max_concurrent_jobs),
            browser_executable: lookup("CHROME_PATH")
                .map(PathBuf::from)
                .or(self.browser_executable),
            no_sandbox: lookup("BROWSER_NO_SANDBOX")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.no_sandbox),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.request_timeout_secs),
            root_dir: lookup("HTML2PDF_ROOT").map(PathBuf::from).or(self.root_dir),
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
        }
    }

    pub fn validate(self) -> AppResult<Self> {
        if self.max_concurrent_jobs == 0 {
            return Err(AppError::Config(
                "max_concurrent_jobs 必须大于 0".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 解析项目根目录：显式配置 > 可执行文件所在目录 > 当前目录
    pub fn resolve_root_dir(&self, cwd: &Path) -> PathBuf {
        if let Some(root) = &self.root_dir {
            return if root.is_absolute() {
                root.clone()
            } else {
                cwd.join(root)
            };
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| cwd.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_overrides_defaults() {
        let config = Config::from_toml_str(
            r#"
            max_concurrent_jobs = 8
            browser_executable = "/usr/bin/chromium"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_concurrent_jobs, 8);
        assert_eq!(
            config.browser_executable.as_deref(),
            Some(Path::new("/usr/bin/chromium"))
        );
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.no_sandbox);
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("MAX_CONCURRENT_JOBS", "2"),
            ("VERBOSE_LOGGING", "true"),
            ("REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_toml_str("max_concurrent_jobs = 8")
            .unwrap()
            .merge_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.max_concurrent_jobs, 2);
        assert!(config.verbose_logging);
        // 无法解析的值保留原配置
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = Config {
            max_concurrent_jobs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = Config::from_toml_str("max_concurrent_jobs = \"many\"");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_relative_root_dir_joins_cwd() {
        let config = Config {
            root_dir: Some(PathBuf::from("book")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_root_dir(Path::new("/work")),
            PathBuf::from("/work/book")
        );
    }
}
