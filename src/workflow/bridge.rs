//! 同步入口到异步批处理的桥接
//!
//! 每次调用新建一个多线程运行时，跑完即销毁；不可在已有运行时中调用

use std::future::Future;

use crate::error::{AppError, AppResult};

/// 在专用运行时上阻塞执行一个 future
///
/// # 参数
/// - `future`: 要执行的异步任务
///
/// # 返回
/// 任务的输出；当前线程已处于 tokio 运行时中或运行时创建失败时返回错误
pub fn run_blocking<F: Future>(future: F) -> AppResult<F::Output> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(AppError::Runtime(
            "run_blocking 不能在 tokio 运行时内部调用".to_string(),
        ));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Runtime(format!("无法创建运行时: {}", e)))?;

    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_runs_future_to_completion() {
        let value = run_blocking(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            21 * 2
        })
        .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_each_call_gets_fresh_runtime() {
        assert_eq!(run_blocking(async { 1 }).unwrap(), 1);
        assert_eq!(run_blocking(async { 2 }).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_nested_call_is_rejected() {
        let result = run_blocking(async { 1 });
        assert!(matches!(result, Err(AppError::Runtime(_))));
    }
}
