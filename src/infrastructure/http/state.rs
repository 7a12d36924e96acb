//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态。
//! 处理器共享同一个 Registry 句柄，而不是各自持有记录快照。

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateDocumentHandler,
    // Query handlers
    GetDocumentHandler, GetParagraphAudioHandler, GetParagraphBatchHandler, GetParagraphHandler,
    GetPipelineRunHandler, ListDocumentsHandler,
    // Ports
    DocumentRegistryPort, ParagraphStorePort, PipelineSchedulerPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub registry: Arc<dyn DocumentRegistryPort>,
    pub paragraph_store: Arc<dyn ParagraphStorePort>,
    pub scheduler: Arc<dyn PipelineSchedulerPort>,

    // ========== Command Handlers ==========
    pub create_document_handler: CreateDocumentHandler,

    // ========== Query Handlers ==========
    pub list_documents_handler: ListDocumentsHandler,
    pub get_document_handler: GetDocumentHandler,
    pub get_pipeline_run_handler: GetPipelineRunHandler,
    pub get_paragraph_handler: GetParagraphHandler,
    pub get_paragraph_batch_handler: GetParagraphBatchHandler,
    pub get_paragraph_audio_handler: GetParagraphAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        registry: Arc<dyn DocumentRegistryPort>,
        paragraph_store: Arc<dyn ParagraphStorePort>,
        scheduler: Arc<dyn PipelineSchedulerPort>,
    ) -> Self {
        Self {
            // Command handlers
            create_document_handler: CreateDocumentHandler::new(
                registry.clone(),
                scheduler.clone(),
            ),

            // Query handlers
            list_documents_handler: ListDocumentsHandler::new(registry.clone()),
            get_document_handler: GetDocumentHandler::new(
                registry.clone(),
                paragraph_store.clone(),
            ),
            get_pipeline_run_handler: GetPipelineRunHandler::new(
                registry.clone(),
                scheduler.clone(),
            ),
            get_paragraph_handler: GetParagraphHandler::new(
                registry.clone(),
                paragraph_store.clone(),
            ),
            get_paragraph_batch_handler: GetParagraphBatchHandler::new(
                registry.clone(),
                paragraph_store.clone(),
            ),
            get_paragraph_audio_handler: GetParagraphAudioHandler::new(
                registry.clone(),
                paragraph_store.clone(),
            ),

            // Ports
            registry,
            paragraph_store,
            scheduler,
        }
    }
}
