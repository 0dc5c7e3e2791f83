//! LLM API 客户端
//!
//! 直接通过 reqwest 调用 OpenAI 兼容的 `/chat/completions` 接口（默认 OpenRouter）
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::completion_client::CompletionClient;
use crate::clients::json_payload::extract_json_object;
use crate::config::Config;
use crate::error::CompletionError;
use crate::models::{CompletionPayload, CompletionRequest, WireResponse};
use crate::utils::logging::truncate_text;

/// LLM 客户端
///
/// 内部的 `reqwest::Client` 自带连接池，可在多个并发任务间共享
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(
        api_key: impl Into<String>,
        api_base_url: &str,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Network(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: format!("{}/chat/completions", api_base_url.trim_end_matches('/')),
            timeout,
        })
    }

    /// 用于作答的客户端（作答超时）
    pub fn for_answers(config: &Config) -> Result<Self, CompletionError> {
        Self::new(
            config.api_key.clone(),
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// 用于题目提取的客户端（提取超时，整份文档一次调用，通常更久）
    pub fn for_extraction(config: &Config) -> Result<Self, CompletionError> {
        Self::new(
            config.api_key.clone(),
            &config.api_base_url,
            Duration::from_secs(config.extraction_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionPayload, CompletionError> {
        debug!("调用 LLM API，模型: {}", request.model());
        debug!("用户消息长度: {} 字符", request.prompt().chars().count());

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| {
                warn!("LLM API 请求失败: {}", e);
                CompletionError::from_reqwest(e, self.timeout)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::from_reqwest(e, self.timeout))?;

        if !status.is_success() {
            warn!("LLM API 返回错误状态: {}", status);
            return Err(CompletionError::HttpStatus {
                status: status.as_u16(),
                body: truncate_text(&body, 200),
            });
        }

        debug!("LLM API 调用成功");

        parse_response_body(&body, request.structured_output())
    }
}

/// 解析接口响应体
///
/// 取 `choices[0].message.content`；结构化模式下再从内容中解析 JSON 对象
pub fn parse_response_body(
    body: &str,
    structured_output: bool,
) -> Result<CompletionPayload, CompletionError> {
    let response: WireResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::Parse(format!("响应体不是合法 JSON: {}", e)))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::Parse("LLM 返回内容为空".to_string()))?;

    if structured_output {
        extract_json_object(&content).map(CompletionPayload::Json)
    } else {
        Ok(CompletionPayload::Text(content.trim().to_string()))
    }
}
