use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::AnswerStyle;

/// 题目提取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// 交给模型识别题目
    #[default]
    Ai,
    /// 本地正则切分
    Heuristic,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ai" | "llm" => Ok(ExtractionMode::Ai),
            "heuristic" | "regex" => Ok(ExtractionMode::Heuristic),
            other => Err(format!("未知的提取方式: {}", other)),
        }
    }
}

/// 程序配置文件
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub api_key: String,
    pub api_base_url: String,
    /// 当前选用的模型
    pub model: String,
    /// 可选模型列表
    pub available_models: Vec<String>,
    /// 作答风格
    pub answer_style: AnswerStyle,
    /// 是否要求模型返回 JSON 对象
    pub structured_output: bool,
    /// 题目提取方式
    pub extraction_mode: ExtractionMode,
    // --- 并发与重试 ---
    /// 同时进行的作答请求数，0 表示不限制
    pub max_concurrency: usize,
    /// 失败后的最大重试次数（总调用次数 = max_retries + 1）
    pub max_retries: u32,
    /// 退避基准时长，第 k 次重试前等待 base * k
    pub retry_base_delay_ms: u64,
    /// 单次作答请求超时
    pub request_timeout_secs: u64,
    /// 题目提取请求超时
    pub extraction_timeout_secs: u64,
    // --- 输入输出 ---
    pub input_pdf: String,
    pub output_pdf: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

/// 配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "QNAFY_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "qnafy.toml";

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://openrouter.ai/api/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            available_models: vec![
                DEFAULT_MODEL.to_string(),
                "meta-llama/llama-3-8b-instruct".to_string(),
                "openai/gpt-4o-mini".to_string(),
            ],
            answer_style: AnswerStyle::Concise,
            structured_output: false,
            extraction_mode: ExtractionMode::Ai,
            max_concurrency: 0,
            max_retries: 2,
            retry_base_delay_ms: 2000,
            request_timeout_secs: 60,
            extraction_timeout_secs: 90,
            input_pdf: "input.pdf".to_string(),
            output_pdf: "QnAfy_Final_Answers.pdf".to_string(),
            output_log_file: "qnafy_run.log".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 完整加载：默认值 → 配置文件 → 环境变量，并校验
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        let config = base.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 只从环境变量加载（未设置的项使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// 从 TOML 文本解析，缺省字段取默认值
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::FileParseFailed {
            path: path.to_string(),
            source,
        })
    }

    fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::invalid(CONFIG_FILE_ENV, format!("无法读取 {}: {}", path, e)))?;
        Self::from_toml_str(&content, path)
    }

    /// 用环境变量覆盖已有配置
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_string("OPENROUTER_API_KEY").unwrap_or(self.api_key),
            api_base_url: env_string("OPENROUTER_BASE_URL").unwrap_or(self.api_base_url),
            model: env_string("OPENROUTER_MODEL").unwrap_or(self.model),
            available_models: env_string("AVAILABLE_MODELS")
                .map(|v| parse_list(&v))
                .unwrap_or(self.available_models),
            answer_style: env_parse("ANSWER_STYLE", "answer style")?.unwrap_or(self.answer_style),
            structured_output: env_parse("STRUCTURED_OUTPUT", "bool")?
                .unwrap_or(self.structured_output),
            extraction_mode: env_parse("EXTRACTION_MODE", "ai | heuristic")?
                .unwrap_or(self.extraction_mode),
            max_concurrency: env_parse("MAX_CONCURRENCY", "usize")?.unwrap_or(self.max_concurrency),
            max_retries: env_parse("MAX_RETRIES", "u32")?.unwrap_or(self.max_retries),
            retry_base_delay_ms: env_parse("RETRY_BASE_DELAY_MS", "u64")?
                .unwrap_or(self.retry_base_delay_ms),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            extraction_timeout_secs: env_parse("EXTRACTION_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.extraction_timeout_secs),
            input_pdf: env_string("INPUT_PDF").unwrap_or(self.input_pdf),
            output_pdf: env_string("OUTPUT_PDF").unwrap_or(self.output_pdf),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }

    /// 校验配置项之间的约束
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("model", "模型标识不能为空"));
        }
        if !self.available_models.iter().any(|m| m == &self.model) {
            return Err(ConfigError::invalid(
                "model",
                format!("{} 不在可选模型列表 {:?} 中", self.model, self.available_models),
            ));
        }
        if self.max_retries > 10 {
            return Err(ConfigError::invalid("max_retries", "不能超过 10"));
        }
        if self.request_timeout_secs == 0 || self.extraction_timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout", "超时时间必须大于 0"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::invalid(
                "api_key",
                "未设置 OPENROUTER_API_KEY，无法调用模型",
            ));
        }
        Ok(())
    }

    /// 并发上限，`None` 表示不限制
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrency > 0).then_some(self.max_concurrency)
    }

    pub fn retry_base_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retry_base_delay_ms)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
