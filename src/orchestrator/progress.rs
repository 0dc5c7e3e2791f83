//! 作答进度通知
//!
//! 进度按完成顺序触发，只用于展示，不影响结果顺序

use tracing::info;

use crate::models::{AnswerRecord, BatchResult};
use crate::utils::logging::truncate_text;

pub trait ProgressReporter: Send + Sync {
    fn on_batch_start(&self, _total: usize) {}

    /// 每完成一道题调用一次，`completed` 从 1 开始计数
    fn on_answer_complete(&self, record: &AnswerRecord, completed: usize, total: usize);

    fn on_batch_complete(&self, _result: &BatchResult) {}
}

/// 不输出任何进度
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn on_answer_complete(&self, _record: &AnswerRecord, _completed: usize, _total: usize) {}
}

/// 通过 tracing 输出进度
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn on_batch_start(&self, total: usize) {
        info!("🚀 开始作答，共 {} 道题目", total);
    }

    fn on_answer_complete(&self, record: &AnswerRecord, completed: usize, total: usize) {
        let mark = if record.is_sentinel() { "⚠️" } else { "✓" };
        info!(
            "[{}/{}] {} Q{}: {}",
            completed,
            total,
            mark,
            record.index + 1,
            truncate_text(&record.question, 60)
        );
    }

    fn on_batch_complete(&self, result: &BatchResult) {
        info!(
            "✅ 作答完成: 成功 {}/{}",
            result.answered_count(),
            result.len()
        );
    }
}
