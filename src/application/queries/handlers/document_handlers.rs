//! Document Query Handlers

use std::sync::Arc;

use super::resolve_document;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    DocumentRegistryPort, ParagraphStorePort, PipelineRun, PipelineSchedulerPort,
};
use crate::application::queries::{DocumentDetail, GetDocument, GetPipelineRun, ListDocuments};
use crate::domain::document::DocumentRecord;

/// ListDocuments Handler
pub struct ListDocumentsHandler {
    registry: Arc<dyn DocumentRegistryPort>,
}

impl ListDocumentsHandler {
    pub fn new(registry: Arc<dyn DocumentRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, _query: ListDocuments) -> Result<Vec<DocumentRecord>, ApplicationError> {
        Ok(self.registry.list().await)
    }
}

/// GetDocument Handler
///
/// 段落信息每次都从文件系统重新推导
pub struct GetDocumentHandler {
    registry: Arc<dyn DocumentRegistryPort>,
    paragraph_store: Arc<dyn ParagraphStorePort>,
}

impl GetDocumentHandler {
    pub fn new(
        registry: Arc<dyn DocumentRegistryPort>,
        paragraph_store: Arc<dyn ParagraphStorePort>,
    ) -> Self {
        Self {
            registry,
            paragraph_store,
        }
    }

    pub async fn handle(&self, query: GetDocument) -> Result<DocumentDetail, ApplicationError> {
        let record = resolve_document(self.registry.as_ref(), &query.document_id).await?;
        let paragraphs = self.paragraph_store.list_infos(record.id()).await?;

        Ok(DocumentDetail { record, paragraphs })
    }
}

/// GetPipelineRun Handler
pub struct GetPipelineRunHandler {
    registry: Arc<dyn DocumentRegistryPort>,
    scheduler: Arc<dyn PipelineSchedulerPort>,
}

impl GetPipelineRunHandler {
    pub fn new(
        registry: Arc<dyn DocumentRegistryPort>,
        scheduler: Arc<dyn PipelineSchedulerPort>,
    ) -> Self {
        Self {
            registry,
            scheduler,
        }
    }

    pub async fn handle(&self, query: GetPipelineRun) -> Result<PipelineRun, ApplicationError> {
        let record = resolve_document(self.registry.as_ref(), &query.document_id).await?;

        self.scheduler
            .get_run(record.id())
            .ok_or_else(|| ApplicationError::not_found("Pipeline run", record.id()))
    }
}
