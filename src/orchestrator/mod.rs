//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量作答和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_orchestrator` - 批量作答编排器
//! - 并发派发一份文档的全部题目（JoinSet）
//! - 控制并发数量（Semaphore，可不限）
//! - 按输入位置收集结果，与完成顺序无关
//!
//! ### `pipeline` - 应用主流程
//! - 读取 PDF、提取题目、作答、生成报告
//! - 持有会话缓存，输出运行统计
//!
//! ### `progress` - 进度通知
//!
//! ## 层次关系
//!
//! ```text
//! pipeline (处理一份 PDF)
//!     ↓
//! batch_orchestrator (处理 Vec<Question>)
//!     ↓
//! services::QuestionAnswerer (处理单个 Question)
//!     ↓
//! services::RetryPolicy → clients::CompletionClient
//! ```

pub mod batch_orchestrator;
pub mod pipeline;
pub mod progress;

// 重新导出主要类型
pub use batch_orchestrator::BatchOrchestrator;
pub use pipeline::{App, RunStats};
pub use progress::{LogProgress, NoProgress, ProgressReporter};
