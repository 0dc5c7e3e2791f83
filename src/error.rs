use std::time::Duration;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 补全接口调用错误
    #[error("补全接口错误: {0}")]
    Completion(#[from] CompletionError),
    /// 题目提取错误
    #[error("题目提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// PDF 读写错误
    #[error("PDF错误: {0}")]
    Pdf(#[from] PdfError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 异步运行时错误
    #[error("运行时错误: {0}")]
    Runtime(String),
}

/// 单次补全调用的失败
///
/// 按是否值得重试分为瞬时错误与永久错误，见 [`CompletionError::is_transient`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// 连接失败等网络错误
    #[error("network error: {0}")]
    Network(String),
    /// 请求超时
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// 接口返回非 2xx 状态码
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// 响应体无法解析或缺少预期内容
    #[error("parse error: {0}")]
    Parse(String),
    /// 调用前即发现的输入错误
    #[error("invalid request: {0}")]
    Validation(String),
}

impl CompletionError {
    /// 是否为瞬时错误（重试可能成功）
    ///
    /// 4xx 中只有 408 / 429 视为瞬时，其余客户端错误（如凭证无效）重试没有意义
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::Network(_)
            | CompletionError::Timeout(_)
            | CompletionError::Parse(_) => true,
            CompletionError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            CompletionError::Validation(_) => false,
        }
    }

    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout(timeout)
        } else if err.is_decode() {
            CompletionError::Parse(err.to_string())
        } else {
            CompletionError::Network(err.to_string())
        }
    }
}

/// 重试耗尽（或遇到永久错误）后的最终失败
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{last} (after {attempts} attempt(s))")]
pub struct RetryFailure {
    /// 实际发起的调用次数
    pub attempts: u32,
    /// 最后一次调用的错误
    pub last: CompletionError,
}

/// 题目提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 提取调用本身失败
    #[error("AI 提取调用失败: {0}")]
    Completion(#[from] CompletionError),
    /// 输入文本为空
    #[error("没有可供提取的文本")]
    EmptyInput,
    /// 切分规则无法编译
    #[error("题目切分规则无效: {0}")]
    Pattern(#[from] regex::Error),
}

/// PDF 读写错误
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("无法解析PDF: {0}")]
    Parse(String),
    #[error("PDF已加密，无法提取文本")]
    Encrypted,
    #[error("PDF生成失败: {0}")]
    Render(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Parse(err.to_string())
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置项取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读写错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> CompletionError {
        CompletionError::HttpStatus {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(CompletionError::Network("reset".into()).is_transient());
        assert!(CompletionError::Timeout(Duration::from_secs(60)).is_transient());
        assert!(CompletionError::Parse("bad json".into()).is_transient());
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(status(408).is_transient());
    }

    #[test]
    fn test_permanent_classification() {
        assert!(!CompletionError::Validation("empty".into()).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(401).is_transient());
        assert!(!status(404).is_transient());
    }

    #[test]
    fn test_retry_failure_display_embeds_cause() {
        let failure = RetryFailure {
            attempts: 3,
            last: status(502),
        };
        let text = failure.to_string();
        assert!(text.contains("HTTP 502"));
        assert!(text.contains("3 attempt"));
    }

    #[test]
    fn test_bad_pattern_becomes_extraction_error() {
        fn compile(pattern: &str) -> Result<regex::Regex, ExtractionError> {
            Ok(regex::Regex::new(pattern)?)
        }

        assert!(compile(r"\d+").is_ok());
        assert!(matches!(compile("(unclosed"), Err(ExtractionError::Pattern(_))));
    }
}
