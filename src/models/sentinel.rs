//! 占位答案
//!
//! 无法作答的题目不会中断批处理，而是以方括号包裹的占位字符串作为答案

/// 题目过短时的跳过标记
pub const SKIPPED: &str = "[Skipped: Too short or unclear]";

/// 结构化响应缺少 `answer` 字段
pub const MALFORMED_RESPONSE: &str = "[Error: Malformed response: missing \"answer\" field]";

/// 携带失败原因的错误标记
pub fn error(cause: impl std::fmt::Display) -> String {
    format!("[Error: {}]", cause)
}

pub fn is_sentinel(answer: &str) -> bool {
    answer.starts_with("[Skipped:") || answer.starts_with("[Error:")
}
