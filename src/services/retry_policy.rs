//! 重试策略 - 业务能力层
//!
//! 把单次补全调用包装成有限次重试 + 退避等待

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{CompletionError, RetryFailure};

/// 重试策略
///
/// 最多调用 `max_retries + 1` 次；第 k 次重试（从 1 开始）前等待 `base_delay * k`。
/// 只对瞬时错误重试，永久错误立即返回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_base_delay())
    }

    /// 不重试
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// 第 `retry` 次重试前的等待时长
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }

    /// 执行操作，直到成功、遇到永久错误或用完重试次数
    ///
    /// 退避使用 `tokio::time::sleep`，等待期间不阻塞其他任务
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, RetryFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CompletionError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("第 {} 次尝试成功", attempt);
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_transient() => {
                    warn!("永久错误，不再重试: {}", err);
                    return Err(RetryFailure {
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) if attempt >= self.max_attempts() => {
                    warn!("已重试 {} 次仍失败: {}", self.max_retries, err);
                    return Err(RetryFailure {
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    let delay = self.delay_before(attempt);
                    warn!(
                        "第 {}/{} 次尝试失败: {}，{:?} 后重试",
                        attempt,
                        self.max_attempts(),
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(2))
    }
}
