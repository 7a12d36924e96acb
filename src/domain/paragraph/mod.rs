//! Paragraph Context - 段落限界上下文
//!
//! 段落由拆分阶段以 `{ordinal}.txt` 文件产出，此处只提供只读视图。

mod entities;
mod value_objects;

pub use entities::{sort_numerically, Paragraph, ParagraphInfo};
pub use value_objects::{ParagraphId, ParagraphIdError};
