//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod document_queries;
mod paragraph_queries;

pub mod handlers;

pub use document_queries::*;
pub use paragraph_queries::*;
