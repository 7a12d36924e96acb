//! Document Layout - 文档目录布局

use std::path::{Path, PathBuf};

use crate::domain::document::DocumentId;
use crate::domain::paragraph::ParagraphId;

pub const INDEX_FILE: &str = "index.json";
pub const RAW_FILE: &str = "file.data";
pub const PARAGRAPHS_DIR: &str = "paragraphs";
pub const AUDIO_DIR: &str = "audio";
pub const PARAGRAPH_EXT: &str = "txt";
pub const AUDIO_EXT: &str = "wav";

/// 根据文档 ID / 段落 ID 计算路径
///
/// 两个存储适配器共享同一份布局，保证写入与读取路径一致
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    root: PathBuf,
}

impl DocumentLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_dir(&self, id: &DocumentId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn index_path(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(INDEX_FILE)
    }

    pub fn raw_file_path(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(RAW_FILE)
    }

    pub fn paragraphs_dir(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(PARAGRAPHS_DIR)
    }

    pub fn audio_dir(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(AUDIO_DIR)
    }

    pub fn paragraph_path(&self, id: &DocumentId, paragraph_id: &ParagraphId) -> PathBuf {
        self.paragraphs_dir(id)
            .join(format!("{}.{}", paragraph_id, PARAGRAPH_EXT))
    }

    pub fn audio_path(&self, id: &DocumentId, paragraph_id: &ParagraphId) -> PathBuf {
        self.audio_dir(id)
            .join(format!("{}.{}", paragraph_id, AUDIO_EXT))
    }
}
