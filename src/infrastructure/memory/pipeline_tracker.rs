//! In-Memory Pipeline Tracker Implementation

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{mpsc, watch};

use crate::application::ports::{
    PipelineError, PipelineRun, PipelineRunState, PipelineSchedulerPort, Stage,
};
use crate::domain::document::DocumentId;

/// 内存流水线跟踪器
///
/// 每个文档一个 watch 通道，既保存运行记录快照，也作为完成信号。
pub struct InMemoryPipelineTracker {
    /// document_id -> 运行记录
    runs: DashMap<DocumentId, watch::Sender<PipelineRun>>,
    /// 流水线队列发送端
    queue_sender: mpsc::Sender<DocumentId>,
}

impl InMemoryPipelineTracker {
    pub fn new(queue_sender: mpsc::Sender<DocumentId>) -> Self {
        Self {
            runs: DashMap::new(),
            queue_sender,
        }
    }

    fn modify(
        &self,
        document_id: &DocumentId,
        f: impl FnOnce(&mut PipelineRun),
    ) -> Result<(), PipelineError> {
        let sender = self
            .runs
            .get(document_id)
            .ok_or_else(|| PipelineError::NotFound(document_id.clone()))?;
        sender.send_modify(f);
        Ok(())
    }
}

#[async_trait]
impl PipelineSchedulerPort for InMemoryPipelineTracker {
    async fn schedule(&self, document_id: &DocumentId) -> Result<(), PipelineError> {
        match self.runs.entry(document_id.clone()) {
            Entry::Occupied(_) => {
                return Err(PipelineError::AlreadyScheduled(document_id.clone()));
            }
            Entry::Vacant(entry) => {
                let (sender, _) = watch::channel(PipelineRun::new(document_id.clone()));
                entry.insert(sender);
            }
        }

        // 运行记录先于入队可见，worker 取到 ID 时一定能找到它。
        // 队列满时在这里等待，只有 worker 已退出才会失败
        if let Err(e) = self.queue_sender.send(document_id.clone()).await {
            let reason = e.to_string();
            self.modify(document_id, |run| {
                run.state = PipelineRunState::Failed;
                run.error = Some(format!("enqueue failed: {}", reason));
                run.finished_at = Some(Utc::now());
            })?;
            return Err(PipelineError::QueueUnavailable {
                id: document_id.clone(),
                reason,
            });
        }

        tracing::debug!(document_id = %document_id, "Pipeline scheduled");
        Ok(())
    }

    fn get_run(&self, document_id: &DocumentId) -> Option<PipelineRun> {
        self.runs.get(document_id).map(|s| s.borrow().clone())
    }

    fn subscribe(&self, document_id: &DocumentId) -> Option<watch::Receiver<PipelineRun>> {
        self.runs.get(document_id).map(|s| s.subscribe())
    }

    fn set_state(&self, document_id: &DocumentId, state: PipelineRunState) -> Result<(), PipelineError> {
        let mut old_state = state;
        self.modify(document_id, |run| {
            old_state = run.state;
            run.state = state;
            if state.is_finished() {
                run.finished_at = Some(Utc::now());
            }
        })?;

        tracing::debug!(
            document_id = %document_id,
            old_state = old_state.as_str(),
            new_state = state.as_str(),
            "Pipeline state changed"
        );
        Ok(())
    }

    fn set_failed(
        &self,
        document_id: &DocumentId,
        stage: Stage,
        error: String,
    ) -> Result<(), PipelineError> {
        self.modify(document_id, |run| {
            run.state = PipelineRunState::Failed;
            run.failed_stage = Some(stage);
            run.error = Some(error);
            run.finished_at = Some(Utc::now());
        })
    }
}
