//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Registry、Store、Stage、PipelineScheduler）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{handlers::CreateDocumentHandler, CreateDocument};

pub use error::ApplicationError;

pub use ports::{
    // Registry
    DocumentRegistryPort,
    IdGenerator,
    RegistryError,
    // Stores
    AudioFile,
    DocumentStorePort,
    ParagraphStorePort,
    StoreError,
    // Pipeline
    PipelineError,
    PipelineRun,
    PipelineRunState,
    PipelineSchedulerPort,
    // Stages
    Stage,
    StageError,
    SplitterPort,
    SynthesizerPort,
};

pub use queries::{
    // Document queries
    DocumentDetail,
    GetDocument,
    GetPipelineRun,
    ListDocuments,
    // Paragraph queries
    GetParagraph,
    GetParagraphAudio,
    GetParagraphBatch,
    // Handlers
    handlers::{
        GetDocumentHandler, GetParagraphAudioHandler, GetParagraphBatchHandler,
        GetParagraphHandler, GetPipelineRunHandler, ListDocumentsHandler,
    },
};
