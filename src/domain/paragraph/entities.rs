//! Paragraph Context - Entities

use serde::Serialize;

use super::ParagraphId;
use crate::domain::document::DocumentId;

/// 段落信息（不含正文）
///
/// 链接由文档 ID 和段落 ID 确定性计算，与音频文件是否存在无关。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphInfo {
    id: ParagraphId,
    link: String,
    audio_link: String,
}

impl ParagraphInfo {
    pub fn new(document_id: &DocumentId, id: ParagraphId) -> Self {
        let link = format!("/documents/{}/paragraphs/{}", document_id, id);
        let audio_link = format!("{}/audio", link);
        Self {
            id,
            link,
            audio_link,
        }
    }

    pub fn id(&self) -> &ParagraphId {
        &self.id
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn audio_link(&self) -> &str {
        &self.audio_link
    }
}

/// 段落（信息 + 正文），按需加载，不缓存
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    #[serde(flatten)]
    info: ParagraphInfo,
    content: String,
}

impl Paragraph {
    pub fn new(info: ParagraphInfo, content: String) -> Self {
        Self { info, content }
    }

    pub fn id(&self) -> &ParagraphId {
        self.info.id()
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// 按段落 ID 的数值升序稳定排序（"2" 在 "10" 之前）
pub fn sort_numerically<T>(items: &mut [T], id_of: impl Fn(&T) -> &ParagraphId) {
    items.sort_by(|a, b| id_of(a).numeric_cmp(id_of(b)));
}
