//! Paragraph HTTP Handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{GetParagraph, GetParagraphAudio, GetParagraphBatch};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// `:spec` 含 `,` 或 `-` 时按批量选择器处理
fn is_batch(spec: &str) -> bool {
    spec.contains(',') || spec.contains('-')
}

/// 获取单个段落或一批段落
pub async fn get_paragraphs(
    State(state): State<Arc<AppState>>,
    Path((document_id, spec)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    if is_batch(&spec) {
        let paragraphs = state
            .get_paragraph_batch_handler
            .handle(GetParagraphBatch {
                document_id,
                selector: spec,
            })
            .await?;
        return Ok(Json(paragraphs).into_response());
    }

    let paragraph = state
        .get_paragraph_handler
        .handle(GetParagraph {
            document_id,
            paragraph_id: spec,
        })
        .await?;
    Ok(Json(paragraph).into_response())
}

/// 以流方式返回段落音频
pub async fn get_paragraph_audio(
    State(state): State<Arc<AppState>>,
    Path((document_id, paragraph_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let audio = state
        .get_paragraph_audio_handler
        .handle(GetParagraphAudio {
            document_id,
            paragraph_id,
        })
        .await?;

    let stream = ReaderStream::new(audio.file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, audio.len)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
