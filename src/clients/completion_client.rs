use async_trait::async_trait;

use crate::error::CompletionError;
use crate::models::{CompletionPayload, CompletionRequest};

/// 补全客户端接口
///
/// 一次 `complete` 调用对应恰好一次外部请求，不在内部重试；
/// 重试由调用方通过 [`crate::services::RetryPolicy`] 负责
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionPayload, CompletionError>;
}
