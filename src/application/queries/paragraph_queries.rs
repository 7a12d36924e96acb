//! Paragraph Queries

/// 获取单个段落
#[derive(Debug, Clone)]
pub struct GetParagraph {
    pub document_id: String,
    pub paragraph_id: String,
}

/// 按选择器批量获取段落，如 `1-3,5`
#[derive(Debug, Clone)]
pub struct GetParagraphBatch {
    pub document_id: String,
    pub selector: String,
}

/// 获取段落音频
#[derive(Debug, Clone)]
pub struct GetParagraphAudio {
    pub document_id: String,
    pub paragraph_id: String,
}
