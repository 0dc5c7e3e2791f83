//! 从模型回复中提取 JSON 对象
//!
//! 模型即使开启了 `json_object` 模式，也常把结果包在 ```json 代码块里

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::error::CompletionError;

fn fence_regex() -> Result<&'static Regex, CompletionError> {
    static FENCE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```"))
        .as_ref()
        .map_err(|e| CompletionError::Parse(format!("代码块规则无效: {}", e)))
}

/// 解析回复中的 JSON 对象
///
/// 依次尝试：代码块内容、整段文本、第一个 `{` 到最后一个 `}` 之间的片段
pub fn extract_json_object(content: &str) -> Result<Map<String, Value>, CompletionError> {
    let trimmed = content.trim();

    let mut candidates: Vec<&str> = Vec::new();
    if let Some(caps) = fence_regex()?.captures(trimmed) {
        if let Some(inner) = caps.get(1) {
            candidates.push(inner.as_str());
        }
    }
    candidates.push(trimmed);
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            candidates.push(&trimmed[start..=end]);
        }
    }

    for candidate in candidates {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            return Ok(map);
        }
    }

    Err(CompletionError::Parse(format!(
        "回复中没有有效的 JSON 对象: {}",
        crate::utils::logging::truncate_text(trimmed, 120)
    )))
}
