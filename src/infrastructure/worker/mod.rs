//! Worker Layer - Background Task Processing
//!
//! 实现 PipelineWorker，依次执行文档的 Split / Synthesize 阶段

mod pipeline_worker;

pub use pipeline_worker::{PipelineWorker, PipelineWorkerConfig, StageBackends};
