//! Document Context - Value Objects

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

use super::DocumentError;

/// 文档 ID 的十六进制长度（128 bit）
pub const DOCUMENT_ID_LEN: usize = 32;

/// 文档唯一标识
///
/// 128 bit 随机值，渲染为 32 位小写十六进制字符串。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// 从任意字符串解析，只接受 32 位小写十六进制
    pub fn parse(s: &str) -> Result<Self, DocumentError> {
        let valid = s.len() == DOCUMENT_ID_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(DocumentError::InvalidId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 文档显示名称（上传者提供）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentName(String);

impl DocumentName {
    pub const MAX_LEN: usize = 512;

    pub fn new(name: impl Into<String>) -> Result<Self, DocumentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DocumentError::EmptyName);
        }
        if name.len() > Self::MAX_LEN {
            return Err(DocumentError::NameTooLong(name.len()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 原始字节的 SHA-1 校验和（小写十六进制）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    pub fn sha1(data: &[u8]) -> Self {
        let digest = Sha1::digest(data);
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
