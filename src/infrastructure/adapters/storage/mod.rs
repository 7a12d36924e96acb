//! Storage Adapter - 文件系统存储实现

mod document_store;
mod layout;
mod paragraph_store;

pub use document_store::FileDocumentStore;
pub use layout::DocumentLayout;
pub use paragraph_store::FileParagraphStore;
