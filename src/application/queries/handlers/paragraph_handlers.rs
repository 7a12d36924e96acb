//! Paragraph Query Handlers

use std::sync::Arc;

use super::resolve_document;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioFile, DocumentRegistryPort, ParagraphStorePort};
use crate::application::queries::{GetParagraph, GetParagraphAudio, GetParagraphBatch};
use crate::domain::paragraph::{Paragraph, ParagraphId};
use crate::domain::parse_selector;

/// GetParagraph Handler
pub struct GetParagraphHandler {
    registry: Arc<dyn DocumentRegistryPort>,
    paragraph_store: Arc<dyn ParagraphStorePort>,
}

impl GetParagraphHandler {
    pub fn new(
        registry: Arc<dyn DocumentRegistryPort>,
        paragraph_store: Arc<dyn ParagraphStorePort>,
    ) -> Self {
        Self {
            registry,
            paragraph_store,
        }
    }

    pub async fn handle(&self, query: GetParagraph) -> Result<Paragraph, ApplicationError> {
        let record = resolve_document(self.registry.as_ref(), &query.document_id).await?;
        let paragraph_id = ParagraphId::parse(&query.paragraph_id)?;

        Ok(self.paragraph_store.load(record.id(), &paragraph_id).await?)
    }
}

/// GetParagraphBatch Handler
///
/// 选择器保留请求顺序与重复，但返回结果由段落存储按数值排序并去重
pub struct GetParagraphBatchHandler {
    registry: Arc<dyn DocumentRegistryPort>,
    paragraph_store: Arc<dyn ParagraphStorePort>,
}

impl GetParagraphBatchHandler {
    pub fn new(
        registry: Arc<dyn DocumentRegistryPort>,
        paragraph_store: Arc<dyn ParagraphStorePort>,
    ) -> Self {
        Self {
            registry,
            paragraph_store,
        }
    }

    pub async fn handle(&self, query: GetParagraphBatch) -> Result<Vec<Paragraph>, ApplicationError> {
        let record = resolve_document(self.registry.as_ref(), &query.document_id).await?;

        let paragraph_ids = parse_selector(&query.selector)?
            .iter()
            .map(|id| ParagraphId::parse(id))
            .collect::<Result<Vec<_>, _>>()?;

        let paragraphs = self
            .paragraph_store
            .load_many(record.id(), &paragraph_ids)
            .await?;

        tracing::debug!(
            document_id = %record.id(),
            requested = paragraph_ids.len(),
            returned = paragraphs.len(),
            "Paragraph batch loaded"
        );

        Ok(paragraphs)
    }
}

/// GetParagraphAudio Handler
pub struct GetParagraphAudioHandler {
    registry: Arc<dyn DocumentRegistryPort>,
    paragraph_store: Arc<dyn ParagraphStorePort>,
}

impl GetParagraphAudioHandler {
    pub fn new(
        registry: Arc<dyn DocumentRegistryPort>,
        paragraph_store: Arc<dyn ParagraphStorePort>,
    ) -> Self {
        Self {
            registry,
            paragraph_store,
        }
    }

    pub async fn handle(&self, query: GetParagraphAudio) -> Result<AudioFile, ApplicationError> {
        let record = resolve_document(self.registry.as_ref(), &query.document_id).await?;
        let paragraph_id = ParagraphId::parse(&query.paragraph_id)?;

        Ok(self
            .paragraph_store
            .open_audio(record.id(), &paragraph_id)
            .await?)
    }
}
