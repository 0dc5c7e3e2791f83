//! 文档会话
//!
//! 按文档标识缓存已提取的题目，按（文档、风格、模型）缓存作答结果。
//! 会话只存在于一次进程内，不落盘

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::models::{AnswerStyle, BatchResult, Question};
use crate::services::QuestionExtractor;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResultKey {
    document_id: String,
    style: AnswerStyle,
    model: String,
}

impl ResultKey {
    fn new(document_id: &str, style: AnswerStyle, model: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            style,
            model: model.to_string(),
        }
    }
}

/// 单个用户的文档会话
#[derive(Debug, Default)]
pub struct DocumentSession {
    questions: HashMap<String, Vec<Question>>,
    results: HashMap<ResultKey, BatchResult>,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions(&self, document_id: &str) -> Option<&[Question]> {
        self.questions.get(document_id).map(Vec::as_slice)
    }

    pub fn store_questions(&mut self, document_id: &str, questions: Vec<Question>) {
        self.questions.insert(document_id.to_string(), questions);
    }

    /// 取缓存的题目，没有则调用提取器
    ///
    /// # 参数
    /// - `model`: 交给提取器的模型
    ///
    /// # 返回
    /// 提取失败时记 warn 并返回 `None`，失败结果不缓存
    pub async fn questions_or_extract(
        &mut self,
        document_id: &str,
        raw_text: &str,
        model: &str,
        extractor: &dyn QuestionExtractor,
    ) -> Option<Vec<Question>> {
        if let Some(cached) = self.questions.get(document_id) {
            debug!("命中题目缓存: {} 道", cached.len());
            return Some(cached.clone());
        }

        match extractor.extract(raw_text, model).await {
            Ok(texts) => {
                let questions = Question::from_texts(texts);
                info!("🔍 提取到 {} 道题目", questions.len());
                self.store_questions(document_id, questions.clone());
                Some(questions)
            }
            Err(e) => {
                warn!("⚠️ 题目提取失败，按无题目处理: {}", e);
                None
            }
        }
    }

    pub fn result(&self, document_id: &str, style: AnswerStyle, model: &str) -> Option<&BatchResult> {
        self.results.get(&ResultKey::new(document_id, style, model))
    }

    pub fn store_result(
        &mut self,
        document_id: &str,
        style: AnswerStyle,
        model: &str,
        result: BatchResult,
    ) {
        self.results
            .insert(ResultKey::new(document_id, style, model), result);
    }

    /// 清空全部缓存
    pub fn clear(&mut self) {
        self.questions.clear();
        self.results.clear();
        debug!("会话已清空");
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty() && self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::models::AnswerRecord;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExtractor {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingExtractor {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl QuestionExtractor for CountingExtractor {
        async fn extract(
            &self,
            _raw_text: &str,
            _model: &str,
        ) -> Result<Vec<String>, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ExtractionError::EmptyInput)
            } else {
                Ok(vec!["What is ownership in Rust?".to_string()])
            }
        }
    }

    #[tokio::test]
    async fn test_questions_are_memoized_per_document() {
        let extractor = CountingExtractor::new(false);
        let mut session = DocumentSession::new();

        let first = session.questions_or_extract("doc-a", "text", "m", &extractor).await;
        let second = session.questions_or_extract("doc-a", "text", "m", &extractor).await;
        assert_eq!(first, second);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);

        session.questions_or_extract("doc-b", "text", "m", &extractor).await;
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_extraction_is_not_cached() {
        let extractor = CountingExtractor::new(true);
        let mut session = DocumentSession::new();

        assert!(session
            .questions_or_extract("doc", "text", "m", &extractor)
            .await
            .is_none());
        assert!(session.questions("doc").is_none());
        session.questions_or_extract("doc", "text", "m", &extractor).await;
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_results_keyed_by_style_and_model() {
        let mut session = DocumentSession::new();
        let question = Question::new(0, "What is a trait object?");
        let result = BatchResult::from_ordered(vec![AnswerRecord::new(&question, "an answer")]);

        session.store_result("doc", AnswerStyle::Concise, "m1", result.clone());

        assert_eq!(session.result("doc", AnswerStyle::Concise, "m1"), Some(&result));
        assert!(session.result("doc", AnswerStyle::Detailed, "m1").is_none());
        assert!(session.result("doc", AnswerStyle::Concise, "m2").is_none());
        assert!(session.result("other", AnswerStyle::Concise, "m1").is_none());
    }

    #[test]
    fn test_clear() {
        let mut session = DocumentSession::new();
        session.store_questions("doc", vec![Question::new(0, "Why is the sky blue?")]);
        session.store_result("doc", AnswerStyle::Concise, "m", BatchResult::default());
        assert!(!session.is_empty());

        session.clear();
        assert!(session.is_empty());
        assert!(session.questions("doc").is_none());
    }
}
