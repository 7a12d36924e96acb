//! Data Transfer Objects

use serde::Serialize;

use crate::application::DocumentDetail;
use crate::domain::document::DocumentRecord;
use crate::domain::paragraph::ParagraphInfo;

/// 文档集合链接
pub const DOCUMENTS_LINK: &str = "/documents";

/// 文档列表（浅视图，不含 paragraphs 字段）
#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentRecord>,
    pub link: &'static str,
}

impl DocumentListResponse {
    pub fn new(documents: Vec<DocumentRecord>) -> Self {
        Self {
            documents,
            link: DOCUMENTS_LINK,
        }
    }
}

/// 文档详情：记录字段 + 段落信息
#[derive(Debug, Serialize)]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub record: DocumentRecord,
    pub paragraphs: Vec<ParagraphInfo>,
}

impl From<DocumentDetail> for DocumentDetailResponse {
    fn from(detail: DocumentDetail) -> Self {
        Self {
            record: detail.record,
            paragraphs: detail.paragraphs,
        }
    }
}
