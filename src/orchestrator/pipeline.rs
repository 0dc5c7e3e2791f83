//! 应用主流程
//!
//! 读取 PDF → 提取题目 → 批量作答 → 生成 Q&A 报告

use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::LlmClient;
use crate::config::{Config, ExtractionMode};
use crate::error::ConfigError;
use crate::infrastructure::{pdf_reader, PdfReportWriter};
use crate::models::{AnswerStyle, BatchResult};
use crate::orchestrator::batch_orchestrator::BatchOrchestrator;
use crate::orchestrator::progress::{LogProgress, ProgressReporter};
use crate::services::{
    AiExtractor, HeuristicExtractor, QuestionAnswerer, QuestionExtractor, RetryPolicy,
};
use crate::utils::logging;
use crate::workflow::DocumentSession;

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub answered: usize,
    pub failed: usize,
}

impl From<&BatchResult> for RunStats {
    fn from(result: &BatchResult) -> Self {
        let answered = result.answered_count();
        Self {
            total: result.len(),
            answered,
            failed: result.len() - answered,
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    style: AnswerStyle,
    model: String,
    orchestrator: BatchOrchestrator,
    extractor: Arc<dyn QuestionExtractor>,
    writer: PdfReportWriter,
    session: DocumentSession,
}

impl App {
    /// 按配置创建真实的 LLM 客户端并组装应用
    pub fn initialize(config: Config) -> Result<Self> {
        let answer_client =
            LlmClient::for_answers(&config).context("无法创建作答客户端")?;
        let answerer = QuestionAnswerer::new(
            Arc::new(answer_client),
            RetryPolicy::from_config(&config),
        )
        .with_structured_output(config.structured_output);

        let extractor: Arc<dyn QuestionExtractor> = match config.extraction_mode {
            ExtractionMode::Ai => {
                let client =
                    LlmClient::for_extraction(&config).context("无法创建题目提取客户端")?;
                Arc::new(
                    AiExtractor::new(Arc::new(client))?
                        .with_structured_output(config.structured_output),
                )
            }
            ExtractionMode::Heuristic => Arc::new(HeuristicExtractor::new()?),
        };

        Ok(Self::with_components(config, Arc::new(answerer), extractor))
    }

    /// 使用外部提供的作答服务与提取器组装应用
    pub fn with_components(
        config: Config,
        answerer: Arc<QuestionAnswerer>,
        extractor: Arc<dyn QuestionExtractor>,
    ) -> Self {
        Self {
            style: config.answer_style,
            model: config.model.clone(),
            orchestrator: BatchOrchestrator::new(answerer).with_progress(Arc::new(LogProgress)),
            extractor,
            writer: PdfReportWriter::default(),
            session: DocumentSession::new(),
            config,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.orchestrator = self.orchestrator.with_progress(progress);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    /// 清空会话缓存，下次处理同一文档会重新提取和作答
    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    pub fn style(&self) -> AnswerStyle {
        self.style
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 切换作答风格和模型，模型必须在可选列表中
    pub fn select(&mut self, style: AnswerStyle, model: &str) -> Result<(), ConfigError> {
        if !self.config.available_models.iter().any(|m| m == model) {
            return Err(ConfigError::invalid(
                "model",
                format!("{} 不在可选模型列表中", model),
            ));
        }
        self.style = style;
        self.model = model.to_string();
        Ok(())
    }

    /// 回答一份 PDF 中的全部题目
    ///
    /// 同一文档在相同风格和模型下只作答一次，之后直接返回缓存。
    /// 题目提取使用当前选中的模型；提取失败返回空结果且不缓存
    pub async fn answer_document(&mut self, pdf_bytes: &[u8]) -> Result<BatchResult> {
        let document_id = pdf_reader::document_id(pdf_bytes);

        if let Some(cached) = self.session.result(&document_id, self.style, &self.model) {
            info!("♻️ 命中缓存结果，跳过作答");
            return Ok(cached.clone());
        }

        let extracted = match self.session.questions(&document_id) {
            Some(cached) => Some(cached.to_vec()),
            None => {
                let raw_text =
                    pdf_reader::extract_text(pdf_bytes).context("无法读取 PDF 文本")?;
                info!("📄 已读取 PDF 文本: {} 字符", raw_text.chars().count());
                self.session
                    .questions_or_extract(
                        &document_id,
                        &raw_text,
                        &self.model,
                        self.extractor.as_ref(),
                    )
                    .await
            }
        };

        // 提取失败时不缓存空结果，下次重新提取
        let Some(questions) = extracted else {
            return Ok(BatchResult::default());
        };

        logging::log_batch_start(&document_id, questions.len());
        let result = self
            .orchestrator
            .answer_all(
                &questions,
                self.style,
                &self.model,
                self.config.concurrency_limit(),
            )
            .await;
        logging::log_batch_complete(result.answered_count(), result.len());

        self.session
            .store_result(&document_id, self.style, &self.model, result.clone());
        Ok(result)
    }

    /// 运行应用主逻辑
    ///
    /// 没有提取到题目时不生成报告
    pub async fn run(&mut self) -> Result<RunStats> {
        let log_file = self.config.output_log_file.clone();
        logging::init_log_file(&log_file, &self.config)?;
        logging::log_startup(&self.config);

        let input = self.config.input_pdf.clone();
        let bytes = fs::read(&input).with_context(|| format!("无法读取输入文件 {}", input))?;

        let result = self.answer_document(&bytes).await?;
        let stats = RunStats::from(&result);

        if result.is_empty() {
            warn!("⚠️ 未提取到任何题目，不生成报告");
            logging::append_log_line(&log_file, "未提取到任何题目")?;
            logging::print_final_stats(0, 0, 0, &log_file);
            return Ok(stats);
        }

        for record in result.iter() {
            logging::append_log_line(
                &log_file,
                &format!("Q{}: {}\nA: {}\n", record.index + 1, record.question, record.answer),
            )?;
        }

        self.writer
            .write_to(&result.to_pairs(), &self.config.output_pdf)
            .context("无法生成 Q&A 报告")?;

        logging::print_final_stats(stats.answered, stats.failed, stats.total, &log_file);
        Ok(stats)
    }
}
