//! Document HTTP Handlers

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{CreateDocument, GetDocument, GetPipelineRun, ListDocuments, PipelineRun};
use crate::domain::document::DocumentRecord;
use crate::infrastructure::http::dto::{DocumentDetailResponse, DocumentListResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 上传文档
///
/// multipart 字段: `name`（非空）, `file`（二进制）。
/// 落盘并注册后立即返回，流水线在后台运行。
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DocumentRecord>, ApiError> {
    let mut name: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => {
                name = Some(field.text().await?);
            }
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                data = Some(field.bytes().await?.to_vec());
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let name = name.ok_or_else(|| ApiError::BadRequest("Field 'name' is required".to_string()))?;
    let data = data.ok_or_else(|| ApiError::BadRequest("Field 'file' is required".to_string()))?;

    let record = state
        .create_document_handler
        .handle(CreateDocument {
            name,
            filename,
            data,
        })
        .await?;

    Ok(Json(record))
}

/// 文档列表（浅视图）
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let documents = state.list_documents_handler.handle(ListDocuments).await?;
    Ok(Json(DocumentListResponse::new(documents)))
}

/// 文档详情（含段落信息）
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentDetailResponse>, ApiError> {
    let detail = state
        .get_document_handler
        .handle(GetDocument { document_id })
        .await?;
    Ok(Json(detail.into()))
}

/// 流水线运行记录
pub async fn get_pipeline_run(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<Json<PipelineRun>, ApiError> {
    let run = state
        .get_pipeline_run_handler
        .handle(GetPipelineRun { document_id })
        .await?;
    Ok(Json(run))
}
