//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Document Context: 上传文档及其生命周期状态机
//! - Paragraph Context: 拆分后的段落（只读视图）
//!
//! 以及共享的批量段落选择器解析

pub mod document;
pub mod paragraph;

mod selector;

pub use selector::{parse_selector, SelectorError, MAX_SELECTION};
