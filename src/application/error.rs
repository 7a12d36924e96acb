//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{PipelineError, RegistryError, StageError, StoreError};
use crate::domain::document::DocumentError;
use crate::domain::paragraph::ParagraphIdError;
use crate::domain::SelectorError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误（请求字段缺失、选择器格式错误等）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 文档目录已存在，说明 ID 生成不变量被破坏
    #[error("Conflict: {0}")]
    Conflict(String),

    /// ID 生成重试耗尽
    #[error("Collision exhausted: {0}")]
    CollisionExhausted(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 外部阶段错误
    #[error("Stage error: {0}")]
    StageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }
}

impl From<RegistryError> for ApplicationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => Self::not_found("Document", id),
            RegistryError::CollisionExhausted { .. } => Self::CollisionExhausted(err.to_string()),
            RegistryError::Conflict(_) => Self::Conflict(err.to_string()),
            RegistryError::InvalidTransition(e) => Self::InternalError(e.to_string()),
            RegistryError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => Self::not_found("File", path),
            StoreError::AlreadyExists(path) => Self::Conflict(format!("already exists: {}", path)),
            StoreError::Io(_) | StoreError::Serialization(_) => Self::StorageError(err.to_string()),
        }
    }
}

impl From<StageError> for ApplicationError {
    fn from(err: StageError) -> Self {
        Self::StageError(err.to_string())
    }
}

impl From<PipelineError> for ApplicationError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound(id) => Self::not_found("Pipeline run", id),
            _ => Self::InternalError(err.to_string()),
        }
    }
}

impl From<DocumentError> for ApplicationError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidTransition { .. } => Self::InternalError(err.to_string()),
            _ => Self::ValidationError(err.to_string()),
        }
    }
}

impl From<ParagraphIdError> for ApplicationError {
    fn from(err: ParagraphIdError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<SelectorError> for ApplicationError {
    fn from(err: SelectorError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
