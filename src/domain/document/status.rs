//! Document Context - 生命周期状态机
//!
//! ```text
//! New --persist--> Saved --split--> Split --synthesize--> Synthesized
//! ```
//!
//! 状态只能沿上图前进一步，阶段失败时保持不变。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DocumentError;

/// 文档生命周期状态
///
/// 顺序即声明顺序，`Ord` 用于单调性判断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// 尚未持久化（读者永远看不到）
    New,
    /// 已落盘，等待拆分
    Saved,
    /// 段落拆分完成
    Split,
    /// 音频合成完成
    Synthesized,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::New => "new",
            DocumentStatus::Saved => "saved",
            DocumentStatus::Split => "split",
            DocumentStatus::Synthesized => "synthesized",
        }
    }

    /// 下一个状态；`Synthesized` 为终态
    pub fn next(&self) -> Option<Self> {
        match self {
            DocumentStatus::New => Some(DocumentStatus::Saved),
            DocumentStatus::Saved => Some(DocumentStatus::Split),
            DocumentStatus::Split => Some(DocumentStatus::Synthesized),
            DocumentStatus::Synthesized => None,
        }
    }

    pub fn can_transition_to(&self, to: DocumentStatus) -> bool {
        self.next() == Some(to)
    }

    /// 校验并返回目标状态
    pub fn transition(self, to: DocumentStatus) -> Result<DocumentStatus, DocumentError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DocumentError::InvalidTransition { from: self, to })
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
