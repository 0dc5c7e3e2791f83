//! 对话补全请求与响应的数据结构
//!
//! 线上格式与 OpenAI 兼容的 `/chat/completions` 接口保持一致

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CompletionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// 一次补全请求
///
/// 每次调用新建，构建后不可修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    structured_output: bool,
}

impl CompletionRequest {
    /// 构建请求并校验：模型非空、消息非空且以 user 消息结尾
    pub fn new(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        structured_output: bool,
    ) -> Result<Self, CompletionError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(CompletionError::Validation("模型标识不能为空".to_string()));
        }
        match messages.last() {
            None => {
                return Err(CompletionError::Validation("消息列表不能为空".to_string()));
            }
            Some(last) if last.role != Role::User => {
                return Err(CompletionError::Validation(
                    "最后一条消息必须是 user 角色".to_string(),
                ));
            }
            Some(_) => {}
        }
        Ok(Self {
            model,
            messages,
            structured_output,
        })
    }

    /// 只含一条 user 消息的请求
    pub fn user_prompt(
        model: impl Into<String>,
        prompt: impl Into<String>,
        structured_output: bool,
    ) -> Result<Self, CompletionError> {
        Self::new(model, vec![ChatMessage::user(prompt)], structured_output)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn structured_output(&self) -> bool {
        self.structured_output
    }

    /// 最后一条 user 消息的内容
    pub fn prompt(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// 序列化为接口请求体
    pub fn to_body(&self) -> WireRequest<'_> {
        WireRequest {
            model: &self.model,
            messages: &self.messages,
            response_format: self
                .structured_output
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// `{choices: [{message: {content}}]}`
#[derive(Debug, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
pub struct WireChoice {
    pub message: WireMessage,
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// 成功的补全结果
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionPayload {
    /// 纯文本回答
    Text(String),
    /// 结构化输出解析得到的 JSON 对象
    Json(Map<String, Value>),
}

impl CompletionPayload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CompletionPayload::Text(text) => Some(text),
            CompletionPayload::Json(_) => None,
        }
    }

    /// 读取结构化结果中的字段
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            CompletionPayload::Json(map) => map.get(key),
            CompletionPayload::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_validation() {
        assert!(CompletionRequest::user_prompt("", "hi", false).is_err());
        assert!(CompletionRequest::new("m", vec![], false).is_err());
        assert!(CompletionRequest::new("m", vec![ChatMessage::system("sys")], false).is_err());

        let request = CompletionRequest::new(
            "m",
            vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            false,
        )
        .unwrap();
        assert_eq!(request.prompt(), "hi");
    }

    #[test]
    fn test_wire_body_plain() {
        let request = CompletionRequest::user_prompt("mistralai/mistral-7b-instruct", "Q?", false)
            .unwrap();
        let body = serde_json::to_value(request.to_body()).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "mistralai/mistral-7b-instruct",
                "messages": [{"role": "user", "content": "Q?"}]
            })
        );
    }

    #[test]
    fn test_wire_body_structured() {
        let request = CompletionRequest::user_prompt("m", "Q?", true).unwrap();
        let body = serde_json::to_value(request.to_body()).unwrap();
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
    }
}
