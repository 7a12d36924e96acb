//! Document Queries

use crate::domain::document::DocumentRecord;
use crate::domain::paragraph::ParagraphInfo;

/// 列出所有文档（浅视图，不含段落）
#[derive(Debug, Clone)]
pub struct ListDocuments;

/// 获取文档详情（含段落信息）
#[derive(Debug, Clone)]
pub struct GetDocument {
    pub document_id: String,
}

/// 获取文档的流水线运行记录
#[derive(Debug, Clone)]
pub struct GetPipelineRun {
    pub document_id: String,
}

/// 文档详情
#[derive(Debug, Clone)]
pub struct DocumentDetail {
    pub record: DocumentRecord,
    pub paragraphs: Vec<ParagraphInfo>,
}
