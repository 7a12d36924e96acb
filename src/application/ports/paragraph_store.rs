//! Paragraph Store Port - 段落文本与音频读取

use async_trait::async_trait;
use tokio::fs::File;

use super::StoreError;
use crate::domain::document::DocumentId;
use crate::domain::paragraph::{Paragraph, ParagraphId, ParagraphInfo};

/// 打开的音频文件
#[derive(Debug)]
pub struct AudioFile {
    pub file: File,
    pub len: u64,
}

/// Paragraph Store Port
#[async_trait]
pub trait ParagraphStorePort: Send + Sync {
    /// 列出段落信息，按 ID 数值升序
    async fn list_infos(&self, document_id: &DocumentId) -> Result<Vec<ParagraphInfo>, StoreError>;

    /// 读取单个段落，文件不存在时返回 NotFound
    async fn load(
        &self,
        document_id: &DocumentId,
        paragraph_id: &ParagraphId,
    ) -> Result<Paragraph, StoreError>;

    /// 批量读取：缺失的段落被跳过，结果按 ID 数值升序并去重
    async fn load_many(
        &self,
        document_id: &DocumentId,
        paragraph_ids: &[ParagraphId],
    ) -> Result<Vec<Paragraph>, StoreError>;

    /// 打开段落音频文件
    async fn open_audio(
        &self,
        document_id: &DocumentId,
        paragraph_id: &ParagraphId,
    ) -> Result<AudioFile, StoreError>;
}
