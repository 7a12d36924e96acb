//! Document Context - 文档限界上下文
//!
//! 职责:
//! - 文档聚合（DocumentRecord）
//! - 生命周期状态机（DocumentStatus）
//! - 标识、名称、校验和等值对象

mod aggregate;
mod errors;
mod status;
mod value_objects;

pub use aggregate::DocumentRecord;
pub use errors::DocumentError;
pub use status::DocumentStatus;
pub use value_objects::{Checksum, DocumentId, DocumentName};
