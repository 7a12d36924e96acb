//! HTTP Layer - RESTful API
//!
//! - /documents                                   GET 列表 / POST 上传
//! - /documents/:id                               GET 详情（含段落）
//! - /documents/:id/pipeline                      GET 流水线运行记录
//! - /documents/:id/paragraphs/:spec              GET 单个段落或批量
//! - /documents/:id/paragraphs/:paragraph_id/audio GET 段落音频

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{build_router, HttpServer, ServerConfig};
pub use state::AppState;
