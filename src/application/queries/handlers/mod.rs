//! Query Handlers 实现

mod document_handlers;
mod paragraph_handlers;

pub use document_handlers::*;
pub use paragraph_handlers::*;

use crate::application::error::ApplicationError;
use crate::application::ports::DocumentRegistryPort;
use crate::domain::document::{DocumentId, DocumentRecord};

/// 解析并确认文档存在；格式非法的 ID 同样视为不存在
async fn resolve_document(
    registry: &dyn DocumentRegistryPort,
    raw_id: &str,
) -> Result<DocumentRecord, ApplicationError> {
    let id = DocumentId::parse(raw_id).map_err(|_| ApplicationError::not_found("Document", raw_id))?;
    Ok(registry.find(&id).await?)
}
