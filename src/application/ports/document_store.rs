//! Document Store Port - 出站端口
//!
//! 文档目录布局:
//!
//! ```text
//! {documents_dir}/{id}/index.json
//! {documents_dir}/{id}/file.data
//! {documents_dir}/{id}/paragraphs/{ordinal}.txt
//! {documents_dir}/{id}/audio/{ordinal}.wav
//! ```

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::document::{DocumentId, DocumentRecord};

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Document Store Port
#[async_trait]
pub trait DocumentStorePort: Send + Sync {
    /// 原始上传文件
    fn raw_file_path(&self, id: &DocumentId) -> PathBuf;

    /// 拆分阶段输出目录
    fn paragraphs_dir(&self, id: &DocumentId) -> PathBuf;

    /// 合成阶段输出目录
    fn audio_dir(&self, id: &DocumentId) -> PathBuf;

    /// 首次持久化：目录已存在时返回 AlreadyExists
    async fn persist(&self, record: &DocumentRecord, data: &[u8]) -> Result<(), StoreError>;

    /// 覆盖写入 index.json
    async fn save_index(&self, record: &DocumentRecord) -> Result<(), StoreError>;

    /// 加载所有已持久化的文档记录
    async fn load_all(&self) -> Result<Vec<DocumentRecord>, StoreError>;
}
