//! File Document Store - 文档记录与原始文件的文件系统实现
//!
//! 实现 DocumentStorePort trait

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::layout::{DocumentLayout, INDEX_FILE};
use crate::application::ports::{DocumentStorePort, StoreError};
use crate::domain::document::{DocumentId, DocumentRecord};

/// 文件系统文档存储
pub struct FileDocumentStore {
    layout: DocumentLayout,
}

impl FileDocumentStore {
    pub fn new(layout: DocumentLayout) -> Self {
        Self { layout }
    }

    /// 先写临时文件再 rename，避免读到半截的 index.json
    async fn write_index(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let index_path = self.layout.index_path(record.id());
        let tmp_path = index_path.with_extension("json.tmp");

        fs::write(&tmp_path, &data).await.map_err(io_error)?;
        fs::rename(&tmp_path, &index_path).await.map_err(io_error)?;
        Ok(())
    }

    async fn write_new_document(
        &self,
        record: &DocumentRecord,
        data: &[u8],
    ) -> Result<(), StoreError> {
        fs::write(self.layout.raw_file_path(record.id()), data)
            .await
            .map_err(io_error)?;
        // index 最后写入：有 index.json 的目录才算完整文档
        self.write_index(record).await
    }

    async fn read_index(path: &Path) -> Result<DocumentRecord, StoreError> {
        let data = fs::read(path).await.map_err(io_error)?;
        serde_json::from_slice(&data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl DocumentStorePort for FileDocumentStore {
    fn raw_file_path(&self, id: &DocumentId) -> PathBuf {
        self.layout.raw_file_path(id)
    }

    fn paragraphs_dir(&self, id: &DocumentId) -> PathBuf {
        self.layout.paragraphs_dir(id)
    }

    fn audio_dir(&self, id: &DocumentId) -> PathBuf {
        self.layout.audio_dir(id)
    }

    async fn persist(&self, record: &DocumentRecord, data: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(self.layout.root())
            .await
            .map_err(io_error)?;

        let document_dir = self.layout.document_dir(record.id());

        // create_dir 不递归，目录已存在时原子地失败
        match fs::create_dir(&document_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(
                    document_dir.to_string_lossy().to_string(),
                ));
            }
            Err(e) => return Err(io_error(e)),
        }

        if let Err(e) = self.write_new_document(record, data).await {
            if let Err(cleanup) = fs::remove_dir_all(&document_dir).await {
                tracing::warn!(
                    document_id = %record.id(),
                    error = %cleanup,
                    "Failed to clean up partially written document"
                );
            }
            return Err(e);
        }

        tracing::debug!(
            document_id = %record.id(),
            size = data.len(),
            "Document persisted"
        );
        Ok(())
    }

    async fn save_index(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        self.write_index(record).await
    }

    async fn load_all(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        let mut entries = match fs::read_dir(self.layout.root()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(e)),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let index_path = path.join(INDEX_FILE);
            match Self::read_index(&index_path).await {
                Ok(record) => {
                    let expected = self.layout.document_dir(record.id());
                    if expected != path {
                        tracing::warn!(
                            path = %path.display(),
                            document_id = %record.id(),
                            "Index id does not match directory, skipping"
                        );
                        continue;
                    }
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %index_path.display(),
                        error = %e,
                        "Skipping unreadable document"
                    );
                }
            }
        }

        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });

        Ok(records)
    }
}

fn io_error(e: std::io::Error) -> StoreError {
    if e.kind() == ErrorKind::NotFound {
        StoreError::NotFound(e.to_string())
    } else {
        StoreError::Io(e.to_string())
    }
}
