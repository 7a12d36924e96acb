//! Document Registry Port - 文档注册表
//!
//! 注册表是文档记录的唯一权威副本。HTTP 处理器与后台流水线
//! 都只能通过这里的同步读写路径访问记录，不能持有并修改私有副本。

use async_trait::async_trait;
use thiserror::Error;

use super::StoreError;
use crate::domain::document::{DocumentError, DocumentId, DocumentName, DocumentRecord, DocumentStatus};

/// Registry 错误
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Failed to generate a unique document id after {attempts} attempts")]
    CollisionExhausted { attempts: usize },

    #[error("Document already registered: {0}")]
    Conflict(DocumentId),

    #[error(transparent)]
    InvalidTransition(#[from] DocumentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 文档 ID 生成器
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> DocumentId;
}

/// Document Registry Port
///
/// 所有方法对并发调用者都是互斥/一致的
#[async_trait]
pub trait DocumentRegistryPort: Send + Sync {
    /// 生成当前未被占用的 ID（有限次重试）
    async fn generate_id(&self) -> Result<DocumentId, RegistryError>;

    /// 创建文档：先落盘，再注册；返回状态为 Saved 的记录
    async fn create(
        &self,
        name: DocumentName,
        filename: Option<String>,
        data: &[u8],
    ) -> Result<DocumentRecord, RegistryError>;

    /// 按 ID 查找
    async fn find(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError>;

    /// 按插入顺序列出全部文档
    async fn list(&self) -> Vec<DocumentRecord>;

    /// 推进文档状态（仅供流水线调用）
    async fn update_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
    ) -> Result<DocumentRecord, RegistryError>;
}
