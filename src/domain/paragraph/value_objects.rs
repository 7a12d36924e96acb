//! Paragraph Context - Value Objects

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParagraphIdError {
    #[error("paragraph id must not be empty")]
    Empty,

    #[error("invalid paragraph id: {0}")]
    Invalid(String),
}

/// 段落标识
///
/// 通常是十进制序号（不补零），但文件名可能不是数字，
/// 因此保留原始字符串，排序时再解析。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParagraphId(String);

impl ParagraphId {
    /// 解析段落 ID，拒绝可能逃出段落目录的值
    pub fn parse(s: &str) -> Result<Self, ParagraphIdError> {
        if s.is_empty() {
            return Err(ParagraphIdError::Empty);
        }
        if s == "." || s == ".." || s.contains('/') || s.contains('\\') || s.contains('\0') {
            return Err(ParagraphIdError::Invalid(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn from_ordinal(ordinal: u64) -> Self {
        Self(ordinal.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 数值排序键；非数字 ID 返回 None
    pub fn ordinal(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// 数值比较：非数字 ID 视为最小，彼此相等
    pub fn numeric_cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
