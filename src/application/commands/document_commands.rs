//! Document Commands

/// 上传文档命令
#[derive(Debug, Clone)]
pub struct CreateDocument {
    /// 显示名称（必填）
    pub name: String,
    /// 上传时的原始文件名，用于推导扩展名
    pub filename: Option<String>,
    /// 原始字节
    pub data: Vec<u8>,
}
