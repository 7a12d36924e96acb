//! Memory Layer - In-Memory State Management
//!
//! 实现 DocumentRegistry 和 PipelineScheduler，管理文档记录与流水线运行的内存状态

mod document_registry;
mod pipeline_tracker;

pub use document_registry::{InMemoryDocumentRegistry, RandomIdGenerator};
pub use pipeline_tracker::InMemoryPipelineTracker;
