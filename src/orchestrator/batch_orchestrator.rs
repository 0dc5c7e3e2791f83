//! 批量作答编排器 - 编排层
//!
//! ## 职责
//!
//! 把一份文档的全部题目并发交给 [`QuestionAnswerer`]，并按原始顺序收集答案。
//!
//! ## 核心约束
//!
//! 1. **顺序**：结果顺序 = 输入顺序，与完成顺序无关
//! 2. **数量**：每道输入题目恰好对应一条记录
//! 3. **隔离**：单题失败已在作答层转为占位答案，不影响其他题目
//! 4. **并发**：`max_concurrency` 限制同时进行的题目数，`None` 表示不限制

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::models::{sentinel, AnswerRecord, AnswerStyle, BatchResult, Question};
use crate::orchestrator::progress::{NoProgress, ProgressReporter};
use crate::services::QuestionAnswerer;

/// 批量作答编排器
pub struct BatchOrchestrator {
    answerer: Arc<QuestionAnswerer>,
    progress: Arc<dyn ProgressReporter>,
}

impl BatchOrchestrator {
    pub fn new(answerer: Arc<QuestionAnswerer>) -> Self {
        Self {
            answerer,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// 并发回答全部题目
    ///
    /// 不支持对同一批题目并发地重复调用
    pub async fn answer_all(
        &self,
        questions: &[Question],
        style: AnswerStyle,
        model: &str,
        max_concurrency: Option<usize>,
    ) -> BatchResult {
        let total = questions.len();
        self.progress.on_batch_start(total);

        if total == 0 {
            let result = BatchResult::default();
            self.progress.on_batch_complete(&result);
            return result;
        }

        debug!(
            "派发 {} 道题目，并发上限: {:?}，风格: {}，模型: {}",
            total, max_concurrency, style, model
        );

        // 0 视为 1，避免永远拿不到许可
        let semaphore = max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
        let model: Arc<str> = Arc::from(model);
        let mut join_set = JoinSet::new();

        for (position, question) in questions.iter().enumerate() {
            let answerer = Arc::clone(&self.answerer);
            let semaphore = semaphore.clone();
            let model = Arc::clone(&model);
            let question = question.clone();

            join_set.spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let answer = answerer.answer(&question.text, style, &model).await;
                (position, AnswerRecord::new(&question, answer))
            });
        }

        // 按输入位置落槽
        let mut slots: Vec<Option<AnswerRecord>> = vec![None; total];
        let mut completed = 0;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((position, record)) => {
                    completed += 1;
                    self.progress.on_answer_complete(&record, completed, total);
                    slots[position] = Some(record);
                }
                Err(e) => {
                    error!("作答任务异常退出: {}", e);
                }
            }
        }

        let records = questions
            .iter()
            .zip(slots)
            .map(|(question, slot)| {
                slot.unwrap_or_else(|| {
                    AnswerRecord::new(question, sentinel::error("answer task aborted"))
                })
            })
            .collect();

        let result = BatchResult::from_ordered(records);
        self.progress.on_batch_complete(&result);
        result
    }
}
