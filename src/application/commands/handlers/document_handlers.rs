//! Document Command Handlers

use std::sync::Arc;

use crate::application::commands::CreateDocument;
use crate::application::error::ApplicationError;
use crate::application::ports::{DocumentRegistryPort, PipelineSchedulerPort};
use crate::domain::document::{DocumentName, DocumentRecord};

/// CreateDocument Handler
///
/// 对持久化是同步的（返回前已落盘并注册），
/// 对流水线是异步的（只负责入队，不等待任何阶段）。
/// 队列已满时等待入队，保证每个成功创建的文档都会启动一次流水线。
pub struct CreateDocumentHandler {
    registry: Arc<dyn DocumentRegistryPort>,
    scheduler: Arc<dyn PipelineSchedulerPort>,
}

impl CreateDocumentHandler {
    pub fn new(
        registry: Arc<dyn DocumentRegistryPort>,
        scheduler: Arc<dyn PipelineSchedulerPort>,
    ) -> Self {
        Self {
            registry,
            scheduler,
        }
    }

    pub async fn handle(&self, command: CreateDocument) -> Result<DocumentRecord, ApplicationError> {
        let name = DocumentName::new(command.name)?;

        let record = self
            .registry
            .create(name, command.filename, &command.data)
            .await?;

        tracing::info!(
            document_id = %record.id(),
            name = %record.name(),
            size = record.size(),
            sha1sum = %record.sha1sum(),
            "Document saved"
        );

        // 只有 worker 已退出时才会失败；文档停留在 saved，请求返回 500
        if let Err(e) = self.scheduler.schedule(record.id()).await {
            tracing::error!(
                document_id = %record.id(),
                error = %e,
                "Failed to schedule pipeline"
            );
            return Err(e.into());
        }

        Ok(record)
    }
}
