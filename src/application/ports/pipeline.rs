//! Pipeline Scheduler Port - 流水线调度与运行记录
//!
//! 每个文档最多调度一次流水线。运行记录捕获阶段进度与失败原因，
//! 使后台失败可以被审计，而不是只留在日志里。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

use super::Stage;
use crate::domain::document::DocumentId;

/// 调度错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pipeline already scheduled for document: {0}")]
    AlreadyScheduled(DocumentId),

    #[error("Pipeline queue unavailable for document {id}: {reason}")]
    QueueUnavailable { id: DocumentId, reason: String },

    #[error("Pipeline run not found: {0}")]
    NotFound(DocumentId),
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineRunState {
    /// 已入队，等待 worker
    Queued,
    /// 拆分中
    Splitting,
    /// 合成中
    Synthesizing,
    /// 全部完成
    Completed,
    /// 某阶段失败（本次运行终止）
    Failed,
}

impl PipelineRunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineRunState::Queued => "queued",
            PipelineRunState::Splitting => "splitting",
            PipelineRunState::Synthesizing => "synthesizing",
            PipelineRunState::Completed => "completed",
            PipelineRunState::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, PipelineRunState::Completed | PipelineRunState::Failed)
    }
}

/// 一次流水线运行
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub document_id: DocumentId,
    pub state: PipelineRunState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub queued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            state: PipelineRunState::Queued,
            failed_stage: None,
            error: None,
            queued_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Pipeline Scheduler Port
///
/// 所有状态存储在内存中，进程重启后不恢复
#[async_trait]
pub trait PipelineSchedulerPort: Send + Sync {
    /// 为文档调度一次流水线；队列已满时等待空位，不丢弃文档
    async fn schedule(&self, document_id: &DocumentId) -> Result<(), PipelineError>;

    /// 获取运行记录快照
    fn get_run(&self, document_id: &DocumentId) -> Option<PipelineRun>;

    /// 订阅运行记录变化（完成信号）
    fn subscribe(&self, document_id: &DocumentId) -> Option<watch::Receiver<PipelineRun>>;

    /// 更新运行状态
    fn set_state(&self, document_id: &DocumentId, state: PipelineRunState) -> Result<(), PipelineError>;

    /// 标记失败并记录错误
    fn set_failed(
        &self,
        document_id: &DocumentId,
        stage: Stage,
        error: String,
    ) -> Result<(), PipelineError>;
}
