//! Document Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Checksum, DocumentError, DocumentId, DocumentName, DocumentStatus};

/// 文档聚合根
///
/// 不变量:
/// - 创建后只有 `status` 会变化
/// - `status` 单调前进
/// - 段落列表不属于聚合，每次读取时从文件系统推导
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    id: DocumentId,
    name: DocumentName,
    size: u64,
    extension: String,
    sha1sum: Checksum,
    status: DocumentStatus,
    link: String,
    created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// 从上传内容创建记录（状态为 New，尚未持久化）
    pub fn new(id: DocumentId, name: DocumentName, filename: Option<&str>, data: &[u8]) -> Self {
        let link = Self::link_for(&id);
        Self {
            id,
            name,
            size: data.len() as u64,
            extension: filename.map(extension_of).unwrap_or_default(),
            sha1sum: Checksum::sha1(data),
            status: DocumentStatus::New,
            link,
            created_at: Utc::now(),
        }
    }

    /// 文档自身链接
    pub fn link_for(id: &DocumentId) -> String {
        format!("/documents/{}", id)
    }

    /// 推进状态，只允许前进一步
    pub fn advance(&mut self, to: DocumentStatus) -> Result<(), DocumentError> {
        self.status = self.status.transition(to)?;
        Ok(())
    }

    /// 返回推进后的副本，不修改自身
    pub fn advanced(&self, to: DocumentStatus) -> Result<Self, DocumentError> {
        let mut next = self.clone();
        next.advance(to)?;
        Ok(next)
    }

    // Getters
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn name(&self) -> &DocumentName {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn sha1sum(&self) -> &Checksum {
        &self.sha1sum
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// 文件扩展名（小写、不含点），没有则为空
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
