//! File Paragraph Store - 段落文本与音频的文件系统实现
//!
//! 实现 ParagraphStorePort trait

use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use super::layout::{DocumentLayout, PARAGRAPH_EXT};
use crate::application::ports::{AudioFile, ParagraphStorePort, StoreError};
use crate::domain::document::DocumentId;
use crate::domain::paragraph::{sort_numerically, Paragraph, ParagraphId, ParagraphInfo};

/// 文件系统段落存储
pub struct FileParagraphStore {
    layout: DocumentLayout,
}

impl FileParagraphStore {
    pub fn new(layout: DocumentLayout) -> Self {
        Self { layout }
    }

    /// 从 `{id}.txt` 文件名提取段落 ID
    fn paragraph_id_of(path: &Path) -> Option<ParagraphId> {
        if path.extension().and_then(|e| e.to_str()) != Some(PARAGRAPH_EXT) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        ParagraphId::parse(stem).ok()
    }
}

#[async_trait]
impl ParagraphStorePort for FileParagraphStore {
    async fn list_infos(&self, document_id: &DocumentId) -> Result<Vec<ParagraphInfo>, StoreError> {
        let paragraphs_dir = self.layout.paragraphs_dir(document_id);

        // 拆分阶段尚未产出时视为没有段落
        let mut entries = match fs::read_dir(&paragraphs_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let mut infos = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(paragraph_id) = Self::paragraph_id_of(&entry.path()) {
                infos.push(ParagraphInfo::new(document_id, paragraph_id));
            }
        }

        sort_numerically(&mut infos, |p| p.id());
        Ok(infos)
    }

    async fn load(
        &self,
        document_id: &DocumentId,
        paragraph_id: &ParagraphId,
    ) -> Result<Paragraph, StoreError> {
        let path = self.layout.paragraph_path(document_id, paragraph_id);

        let content = match fs::read(&path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!(
                    "paragraph {} of document {}",
                    paragraph_id, document_id
                )));
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        Ok(Paragraph::new(
            ParagraphInfo::new(document_id, paragraph_id.clone()),
            content,
        ))
    }

    async fn load_many(
        &self,
        document_id: &DocumentId,
        paragraph_ids: &[ParagraphId],
    ) -> Result<Vec<Paragraph>, StoreError> {
        let mut seen = HashSet::new();
        let mut paragraphs = Vec::with_capacity(paragraph_ids.len());

        for paragraph_id in paragraph_ids {
            if !seen.insert(paragraph_id) {
                continue;
            }
            match self.load(document_id, paragraph_id).await {
                Ok(paragraph) => paragraphs.push(paragraph),
                Err(StoreError::NotFound(_)) => {
                    tracing::debug!(
                        document_id = %document_id,
                        paragraph_id = %paragraph_id,
                        "Paragraph missing, skipped"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        sort_numerically(&mut paragraphs, |p| p.id());
        Ok(paragraphs)
    }

    async fn open_audio(
        &self,
        document_id: &DocumentId,
        paragraph_id: &ParagraphId,
    ) -> Result<AudioFile, StoreError> {
        let path = self.layout.audio_path(document_id, paragraph_id);

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!(
                    "audio {} of document {}",
                    paragraph_id, document_id
                )));
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let metadata = file
            .metadata()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(path.to_string_lossy().to_string()));
        }

        Ok(AudioFile {
            file,
            len: metadata.len(),
        })
    }
}
