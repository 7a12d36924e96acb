//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod document_registry;
mod document_store;
mod paragraph_store;
mod pipeline;
mod stages;

pub use document_registry::{DocumentRegistryPort, IdGenerator, RegistryError};
pub use document_store::{DocumentStorePort, StoreError};
pub use paragraph_store::{AudioFile, ParagraphStorePort};
pub use pipeline::{PipelineError, PipelineRun, PipelineRunState, PipelineSchedulerPort};
pub use stages::{Stage, StageError, SplitterPort, SynthesizerPort};
