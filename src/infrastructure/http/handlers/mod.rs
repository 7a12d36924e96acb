//! HTTP Handlers

mod document;
mod paragraph;
mod ping;

pub use document::*;
pub use paragraph::*;
pub use ping::*;
