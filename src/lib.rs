//! # QnAfy
//!
//! 从 PDF 中提取题目，调用大模型逐题作答，并把问答结果生成新的 PDF
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - PDF 字节的读写，不认识题目
//! - `pdf_reader` - 逐页提取文本、计算文档标识
//! - `PdfReportWriter` - 分页渲染问答对
//!
//! ### ② 客户端（Clients）
//! - `CompletionClient` - 一次调用对应一次外部请求
//! - `LlmClient` - OpenAI 兼容的 `/chat/completions` 实现
//!
//! ### ③ 业务能力层（Services）
//! - `RetryPolicy` - 有界重试与线性退避
//! - `QuestionAnswerer` - 回答一道题，失败转为占位答案
//! - `QuestionExtractor` - 正则 / AI 两种题目提取
//!
//! ### ④ 流程层（Workflow）
//! - `DocumentSession` - 按文档缓存题目与结果
//! - `run_blocking` - 从同步代码执行一次异步批处理
//!
//! ### ⑤ 编排层（Orchestration）
//! - `BatchOrchestrator` - 并发作答并保持原始顺序
//! - `App` - 读取 → 提取 → 作答 → 渲染
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CompletionClient, LlmClient};
pub use config::{Config, ExtractionMode};
pub use error::{AppError, AppResult, CompletionError};
pub use infrastructure::PdfReportWriter;
pub use models::{AnswerRecord, AnswerStyle, BatchResult, Question};
pub use orchestrator::{App, BatchOrchestrator, RunStats};
pub use services::{QuestionAnswerer, RetryPolicy};
pub use workflow::{run_blocking, DocumentSession};
