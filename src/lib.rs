//! docvoice - 文档拆分与语音合成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Document Context: 文档记录与生命周期状态机
//! - Paragraph Context: 段落信息与数值排序
//! - Selector: 批量段落选择器解析
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Registry, DocumentStore, ParagraphStore, Splitter, Synthesizer, PipelineScheduler）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: Registry, PipelineTracker 内存实现
//! - Worker: PipelineWorker 后台流水线
//! - Adapters: 文件系统存储, 外部命令阶段

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
