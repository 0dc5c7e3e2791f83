//! 作答服务 - 业务能力层
//!
//! 只负责"回答一道题"，不关心批次与顺序

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clients::CompletionClient;
use crate::models::{sentinel, AnswerStyle, CompletionPayload, CompletionRequest};
use crate::services::RetryPolicy;
use crate::utils::logging::truncate_text;

/// 低于此长度的题目直接跳过，不发起调用
pub const MIN_QUESTION_CHARS: usize = 10;

const STRUCTURED_DIRECTIVE: &str =
    "Respond only with a JSON object of the form {\"answer\": \"<your answer>\"}.";

/// 作答服务
///
/// 职责：
/// - 按风格拼装提示词
/// - 通过重试策略调用补全接口
/// - 把任何失败转换成占位答案，绝不向上抛错
pub struct QuestionAnswerer {
    client: Arc<dyn CompletionClient>,
    retry: RetryPolicy,
    structured_output: bool,
}

impl QuestionAnswerer {
    pub fn new(client: Arc<dyn CompletionClient>, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            structured_output: false,
        }
    }

    /// 要求模型以 `{"answer": ...}` 形式返回
    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }

    pub fn structured_output(&self) -> bool {
        self.structured_output
    }

    /// 回答一道题
    ///
    /// 返回答案文本，或以下占位符之一：
    /// - 题目过短：[`sentinel::SKIPPED`]
    /// - 重试耗尽或永久错误：`[Error: ...]`
    /// - 结构化结果缺少 `answer` 字段：[`sentinel::MALFORMED_RESPONSE`]
    pub async fn answer(&self, question: &str, style: AnswerStyle, model: &str) -> String {
        if question.trim().chars().count() < MIN_QUESTION_CHARS {
            debug!("题目过短，跳过: {:?}", question);
            return sentinel::SKIPPED.to_string();
        }

        let prompt = self.build_prompt(question, style);
        let request = match CompletionRequest::user_prompt(model, prompt, self.structured_output) {
            Ok(request) => request,
            Err(e) => {
                warn!("请求构建失败: {}", e);
                return sentinel::error(e);
            }
        };

        match self.retry.run(|| self.client.complete(&request)).await {
            Ok(payload) => normalize_payload(payload),
            Err(failure) => {
                warn!(
                    "题目作答失败: {} | {}",
                    truncate_text(question, 40),
                    failure
                );
                sentinel::error(failure.last)
            }
        }
    }

    /// 拼装提示词：风格指令 + 空行 + 题目
    pub fn build_prompt(&self, question: &str, style: AnswerStyle) -> String {
        if self.structured_output {
            format!(
                "{}\n\n{}\n\n{}",
                style.instruction(),
                question,
                STRUCTURED_DIRECTIVE
            )
        } else {
            format!("{}\n\n{}", style.instruction(), question)
        }
    }
}

/// 把补全结果规整为答案文本
fn normalize_payload(payload: CompletionPayload) -> String {
    match payload {
        CompletionPayload::Text(text) => text.trim().to_string(),
        CompletionPayload::Json(map) => match map.get("answer") {
            Some(Value::String(answer)) => answer.trim().to_string(),
            Some(Value::Null) | None => sentinel::MALFORMED_RESPONSE.to_string(),
            Some(other) => other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// 按顺序返回预设结果的假客户端
    struct ScriptedClient {
        replies: Mutex<Vec<Result<CompletionPayload, CompletionError>>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn new(mut replies: Vec<Result<CompletionPayload, CompletionError>>) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionPayload, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(CompletionError::Network("no scripted reply".into())))
        }
    }

    fn json_payload(value: serde_json::Value) -> CompletionPayload {
        match value {
            serde_json::Value::Object(map) => CompletionPayload::Json(map),
            _ => CompletionPayload::Json(Map::new()),
        }
    }

    fn answerer(client: Arc<ScriptedClient>) -> QuestionAnswerer {
        QuestionAnswerer::new(client, RetryPolicy::new(2, Duration::from_millis(1)))
    }

    const QUESTION: &str = "What is the borrow checker?";

    #[tokio::test]
    async fn test_short_question_is_skipped_without_call() {
        let client = ScriptedClient::new(vec![]);
        let answerer = answerer(client.clone());

        assert_eq!(
            answerer.answer("Why?", AnswerStyle::Concise, "m").await,
            sentinel::SKIPPED
        );
        assert_eq!(
            answerer.answer("   ", AnswerStyle::Concise, "m").await,
            sentinel::SKIPPED
        );
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_plain_text_answer_is_trimmed() {
        let client = ScriptedClient::new(vec![Ok(CompletionPayload::Text(
            "  It enforces ownership rules.\n".into(),
        ))]);
        let answerer = answerer(client.clone());

        let answer = answerer.answer(QUESTION, AnswerStyle::Detailed, "m").await;
        assert_eq!(answer, "It enforces ownership rules.");

        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request.prompt(),
            "Explain this in detail:\n\nWhat is the borrow checker?"
        );
        assert!(!request.structured_output());
    }

    #[tokio::test]
    async fn test_structured_answer_field() {
        let client = ScriptedClient::new(vec![Ok(json_payload(json!({"answer": "x"})))]);
        let answerer = answerer(client.clone()).with_structured_output(true);

        assert_eq!(answerer.answer(QUESTION, AnswerStyle::Concise, "m").await, "x");
        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert!(request.structured_output());
        assert!(request.prompt().contains("\"answer\""));
    }

    #[tokio::test]
    async fn test_structured_missing_field_is_malformed_sentinel() {
        let client = ScriptedClient::new(vec![Ok(json_payload(json!({})))]);
        let answerer = answerer(client.clone()).with_structured_output(true);

        assert_eq!(
            answerer.answer(QUESTION, AnswerStyle::Concise, "m").await,
            sentinel::MALFORMED_RESPONSE
        );
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_structured_non_string_answer_is_stringified() {
        let client = ScriptedClient::new(vec![Ok(json_payload(json!({"answer": 42})))]);
        let answerer = answerer(client).with_structured_output(true);

        assert_eq!(answerer.answer(QUESTION, AnswerStyle::Concise, "m").await, "42");
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_becomes_error_sentinel() {
        let client = ScriptedClient::new(vec![
            Err(CompletionError::Network("down".into())),
            Err(CompletionError::Network("down".into())),
            Err(CompletionError::Network("still down".into())),
        ]);
        let answerer = answerer(client.clone());

        let answer = answerer.answer(QUESTION, AnswerStyle::Concise, "m").await;
        assert_eq!(answer, "[Error: network error: still down]");
        assert!(sentinel::is_sentinel(&answer));
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_model_is_validation_sentinel_without_call() {
        let client = ScriptedClient::new(vec![]);
        let answerer = answerer(client.clone());

        let answer = answerer.answer(QUESTION, AnswerStyle::Concise, "").await;
        assert!(answer.starts_with("[Error: invalid request"));
        assert_eq!(client.calls(), 0);
    }
}
