//! 题目提取服务 - 业务能力层
//!
//! 从整份文档的原始文本中切分出题目列表。
//! 正则切分与 AI 识别是同一接口的两种实现，可互相替换

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::CompletionClient;
use crate::error::ExtractionError;
use crate::models::{CompletionPayload, CompletionRequest};
use crate::services::question_answerer::MIN_QUESTION_CHARS;

/// 题目提取接口
#[async_trait]
pub trait QuestionExtractor: Send + Sync {
    /// 返回按出现顺序排列的题目文本
    ///
    /// `model` 为当前选用的模型，不调用模型的实现可以忽略它。
    /// 响应格式不符合预期时返回空列表；只有调用本身失败才返回错误
    async fn extract(&self, raw_text: &str, model: &str) -> Result<Vec<String>, ExtractionError>;
}

// ========== 正则切分 ==========

/// 基于标点的本地切分
///
/// 1. 合并连续空白
/// 2. 按句末标点切句
/// 3. 去掉句首编号（`1.`、`2)`、`Q3:`）
/// 4. 只保留以问号结尾且长度达标的句子
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    min_chars: usize,
    whitespace: Regex,
    sentence: Regex,
    numbering: Regex,
}

impl HeuristicExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            min_chars: MIN_QUESTION_CHARS,
            whitespace: Regex::new(r"\s+")?,
            sentence: Regex::new(r"[^.?!？。！]+[.?!？。！]*")?,
            numbering: Regex::new(r"^(?:(?:Q|Question)\s*)?\d+\s*[.):：、]\s*")?,
        })
    }

    /// 调整最短题目长度（按字符计）
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn segment(&self, raw_text: &str) -> Vec<String> {
        let normalized = self.whitespace.replace_all(raw_text, " ");

        self.sentence
            .find_iter(&normalized)
            .map(|m| m.as_str().trim())
            .filter(|s| s.ends_with('?') || s.ends_with('？'))
            .map(|s| self.numbering.replace(s, "").trim().to_string())
            .filter(|s| s.chars().count() >= self.min_chars)
            .collect()
    }
}

#[async_trait]
impl QuestionExtractor for HeuristicExtractor {
    async fn extract(&self, raw_text: &str, _model: &str) -> Result<Vec<String>, ExtractionError> {
        let questions = self.segment(raw_text);
        debug!("正则切分得到 {} 道题目", questions.len());
        Ok(questions)
    }
}

// ========== AI 识别 ==========

const EXTRACTION_PROMPT: &str = "Extract all distinct technical interview questions from the following raw PDF content.\nReturn only a numbered list of actual questions. Ignore section headers, context text, and answers.";

const EXTRACTION_PROMPT_JSON: &str = "Extract all distinct technical interview questions from the following raw PDF content.\nIgnore section headers, context text, and answers.\nRespond only with a JSON object of the form {\"questions\": [\"<question 1>\", \"<question 2>\"]}.";

/// 交给模型识别题目
///
/// 整份文档只发起一次调用，不并发也不重试
pub struct AiExtractor {
    client: Arc<dyn CompletionClient>,
    structured_output: bool,
    numbered_line: Regex,
}

impl AiExtractor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Result<Self, ExtractionError> {
        Ok(Self {
            client,
            structured_output: false,
            numbered_line: Regex::new(r"\d+\.\s*(.+)")?,
        })
    }

    /// 要求模型以 `{"questions": [...]}` 形式返回
    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }

    pub fn build_prompt(&self, raw_text: &str) -> String {
        let instruction = if self.structured_output {
            EXTRACTION_PROMPT_JSON
        } else {
            EXTRACTION_PROMPT
        };
        format!("{}\n\nText:\n{}", instruction, raw_text)
    }

    /// 从模型回复中取出题目列表
    ///
    /// - 结构化结果：读取 `questions` 数组，键缺失或类型不对时返回空列表
    /// - 纯文本：匹配编号行 `1. xxx`
    pub fn questions_from_payload(&self, payload: &CompletionPayload) -> Vec<String> {
        match payload {
            CompletionPayload::Json(map) => match map.get("questions") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                _ => {
                    warn!("提取结果缺少 questions 数组，按空列表处理");
                    Vec::new()
                }
            },
            CompletionPayload::Text(text) => self
                .numbered_line
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

#[async_trait]
impl QuestionExtractor for AiExtractor {
    async fn extract(&self, raw_text: &str, model: &str) -> Result<Vec<String>, ExtractionError> {
        if raw_text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        info!("🧠 正在使用 AI 提取题目，模型: {}", model);

        let request = CompletionRequest::user_prompt(
            model,
            self.build_prompt(raw_text),
            self.structured_output,
        )?;
        let payload = self.client.complete(&request).await?;

        Ok(self.questions_from_payload(&payload))
    }
}
