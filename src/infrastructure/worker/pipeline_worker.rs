//! Pipeline Worker - Background Split / Synthesize Processor

use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::application::ports::{
    DocumentRegistryPort, DocumentStorePort, PipelineRunState, PipelineSchedulerPort, Stage,
    SplitterPort, SynthesizerPort,
};
use crate::domain::document::{DocumentId, DocumentStatus};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct PipelineWorkerConfig {
    /// 最大并发流水线数
    pub max_concurrent: usize,
}

impl Default for PipelineWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

/// 两个阶段的外部协作者
#[derive(Clone)]
pub struct StageBackends {
    pub splitter: Arc<dyn SplitterPort>,
    pub synthesizer: Arc<dyn SynthesizerPort>,
}

/// 单个文档流水线所需的全部依赖
#[derive(Clone)]
struct Pipeline {
    registry: Arc<dyn DocumentRegistryPort>,
    store: Arc<dyn DocumentStorePort>,
    scheduler: Arc<dyn PipelineSchedulerPort>,
    stages: StageBackends,
}

/// 流水线 Worker
///
/// 后台任务处理器，从队列消费文档 ID，每个文档在独立任务中运行，
/// 同一文档的两个阶段严格串行，不同文档之间并行且无顺序保证。
pub struct PipelineWorker {
    config: PipelineWorkerConfig,
    queue_receiver: mpsc::Receiver<DocumentId>,
    pipeline: Pipeline,
}

impl PipelineWorker {
    pub fn new(
        config: PipelineWorkerConfig,
        queue_receiver: mpsc::Receiver<DocumentId>,
        registry: Arc<dyn DocumentRegistryPort>,
        store: Arc<dyn DocumentStorePort>,
        scheduler: Arc<dyn PipelineSchedulerPort>,
        stages: StageBackends,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            pipeline: Pipeline {
                registry,
                store,
                scheduler,
                stages,
            },
        }
    }

    /// 启动 Worker，队列所有发送端关闭后返回
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "PipelineWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));

        while let Some(document_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    break;
                }
            };

            let pipeline = self.pipeline.clone();
            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到流水线结束
                pipeline.process(&document_id).await;
            });
        }

        tracing::info!("PipelineWorker stopped");
    }
}

impl Pipeline {
    async fn process(&self, document_id: &DocumentId) {
        let record = match self.registry.find(document_id).await {
            Ok(record) => record,
            Err(e) => {
                self.fail(document_id, Stage::Split, e.to_string());
                return;
            }
        };

        if record.status() != DocumentStatus::Saved {
            self.fail(
                document_id,
                Stage::Split,
                format!("document is {}, expected saved", record.status()),
            );
            return;
        }

        // Split
        self.set_state(document_id, PipelineRunState::Splitting);
        let input_file = self.store.raw_file_path(document_id);
        let paragraphs_dir = self.store.paragraphs_dir(document_id);

        if let Err(e) = tokio::fs::create_dir_all(&paragraphs_dir).await {
            self.fail(document_id, Stage::Split, e.to_string());
            return;
        }
        if let Err(e) = self
            .stages
            .splitter
            .split(&input_file, &paragraphs_dir)
            .await
        {
            self.discard_paragraphs(document_id, &paragraphs_dir).await;
            self.fail(document_id, Stage::Split, e.to_string());
            return;
        }
        if let Err(e) = self
            .registry
            .update_status(document_id, DocumentStatus::Split)
            .await
        {
            self.discard_paragraphs(document_id, &paragraphs_dir).await;
            self.fail(document_id, Stage::Split, e.to_string());
            return;
        }
        tracing::info!(document_id = %document_id, "Document split");

        // Synthesize
        self.set_state(document_id, PipelineRunState::Synthesizing);
        let audio_dir = self.store.audio_dir(document_id);

        if let Err(e) = tokio::fs::create_dir_all(&audio_dir).await {
            self.fail(document_id, Stage::Synthesize, e.to_string());
            return;
        }
        if let Err(e) = self
            .stages
            .synthesizer
            .synthesize(&paragraphs_dir, &audio_dir)
            .await
        {
            self.fail(document_id, Stage::Synthesize, e.to_string());
            return;
        }
        if let Err(e) = self
            .registry
            .update_status(document_id, DocumentStatus::Synthesized)
            .await
        {
            self.fail(document_id, Stage::Synthesize, e.to_string());
            return;
        }

        self.set_state(document_id, PipelineRunState::Completed);
        tracing::info!(document_id = %document_id, "Document synthesized");
    }

    fn set_state(&self, document_id: &DocumentId, state: PipelineRunState) {
        if let Err(e) = self.scheduler.set_state(document_id, state) {
            tracing::warn!(document_id = %document_id, error = %e, "Failed to update pipeline run");
        }
    }

    /// 拆分未成功时，文档仍是 saved，不应暴露部分输出
    async fn discard_paragraphs(&self, document_id: &DocumentId, paragraphs_dir: &Path) {
        if let Err(e) = tokio::fs::remove_dir_all(paragraphs_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    document_id = %document_id,
                    error = %e,
                    "Failed to clean up partial split output"
                );
            }
        }
    }

    /// 阶段失败是本次运行的终点，文档停留在最后一次成功的状态
    fn fail(&self, document_id: &DocumentId, stage: Stage, error: String) {
        tracing::error!(
            document_id = %document_id,
            stage = stage.as_str(),
            error = %error,
            "Pipeline stage failed"
        );
        if let Err(e) = self.scheduler.set_failed(document_id, stage, error) {
            tracing::warn!(document_id = %document_id, error = %e, "Failed to record pipeline failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ParagraphStorePort, PipelineRun, StageError, StoreError};
    use crate::domain::document::{DocumentName, DocumentRecord};
    use crate::domain::paragraph::ParagraphId;
    use crate::infrastructure::adapters::stages::{FakeSplitter, FakeSynthesizer};
    use crate::infrastructure::adapters::storage::{
        DocumentLayout, FileDocumentStore, FileParagraphStore,
    };
    use crate::infrastructure::memory::{
        InMemoryDocumentRegistry, InMemoryPipelineTracker, RandomIdGenerator,
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        dir: TempDir,
        registry: Arc<InMemoryDocumentRegistry>,
        store: Arc<FileDocumentStore>,
        tracker: Arc<InMemoryPipelineTracker>,
    }

    fn start(splitter: impl SplitterPort + 'static, synthesizer: impl SynthesizerPort + 'static) -> Fixture {
        start_with(splitter, synthesizer, 2, 16)
    }

    fn start_with(
        splitter: impl SplitterPort + 'static,
        synthesizer: impl SynthesizerPort + 'static,
        max_concurrent: usize,
        queue_capacity: usize,
    ) -> Fixture {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileDocumentStore::new(DocumentLayout::new(dir.path())));
        let registry = Arc::new(InMemoryDocumentRegistry::new(
            store.clone(),
            Arc::new(RandomIdGenerator),
        ));
        let (tx, rx) = mpsc::channel(queue_capacity);
        let tracker = Arc::new(InMemoryPipelineTracker::new(tx));

        let worker = PipelineWorker::new(
            PipelineWorkerConfig { max_concurrent },
            rx,
            registry.clone(),
            store.clone(),
            tracker.clone(),
            StageBackends {
                splitter: Arc::new(splitter),
                synthesizer: Arc::new(synthesizer),
            },
        );
        tokio::spawn(worker.run());

        Fixture {
            dir,
            registry,
            store,
            tracker,
        }
    }

    async fn submit(fx: &Fixture, content: &str) -> DocumentRecord {
        let record = fx
            .registry
            .create(DocumentName::new("doc").unwrap(), None, content.as_bytes())
            .await
            .unwrap();
        fx.tracker.schedule(record.id()).await.unwrap();
        record
    }

    async fn finished(fx: &Fixture, id: &DocumentId) -> PipelineRun {
        let mut updates = fx.tracker.subscribe(id).unwrap();
        let run = tokio::time::timeout(
            Duration::from_secs(5),
            updates.wait_for(|run| run.state.is_finished()),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        run
    }

    #[tokio::test]
    async fn test_pipeline_success() {
        let fx = start(FakeSplitter::new(), FakeSynthesizer::new());
        let record = submit(&fx, "one\n\ntwo\n\nthree").await;

        let run = finished(&fx, record.id()).await;
        assert_eq!(run.state, PipelineRunState::Completed);

        let current = fx.registry.find(record.id()).await.unwrap();
        assert_eq!(current.status(), DocumentStatus::Synthesized);
        assert!(fx.store.audio_dir(record.id()).join("3.wav").is_file());

        // 持久化的状态与内存一致
        let persisted = fx.store.load_all().await.unwrap();
        assert_eq!(persisted[0].status(), DocumentStatus::Synthesized);
    }

    #[tokio::test]
    async fn test_split_failure_leaves_saved() {
        let fx = start(FakeSplitter::failing(), FakeSynthesizer::new());
        let record = submit(&fx, "text").await;

        let run = finished(&fx, record.id()).await;
        assert_eq!(run.state, PipelineRunState::Failed);
        assert_eq!(run.failed_stage, Some(Stage::Split));
        assert!(run.error.is_some());

        let current = fx.registry.find(record.id()).await.unwrap();
        assert_eq!(current.status(), DocumentStatus::Saved);
        assert!(!fx.store.audio_dir(record.id()).exists());
    }

    #[tokio::test]
    async fn test_synthesis_failure_leaves_split() {
        let fx = start(FakeSplitter::new(), FakeSynthesizer::failing());
        let record = submit(&fx, "a\n\nb").await;

        let run = finished(&fx, record.id()).await;
        assert_eq!(run.failed_stage, Some(Stage::Synthesize));

        let current = fx.registry.find(record.id()).await.unwrap();
        assert_eq!(current.status(), DocumentStatus::Split);
    }

    #[tokio::test]
    async fn test_split_visible_before_synthesis() {
        let gate = Arc::new(Semaphore::new(0));
        let fx = start(FakeSplitter::new(), FakeSynthesizer::with_gate(gate.clone()));
        let record = submit(&fx, "a\n\nb").await;

        let mut updates = fx.tracker.subscribe(record.id()).unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            updates.wait_for(|run| run.state == PipelineRunState::Synthesizing),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(
            fx.registry.find(record.id()).await.unwrap().status(),
            DocumentStatus::Split
        );

        gate.add_permits(1);
        let run = finished(&fx, record.id()).await;
        assert_eq!(run.state, PipelineRunState::Completed);
    }

    #[tokio::test]
    async fn test_many_documents_in_parallel() {
        let fx = start(FakeSplitter::new(), FakeSynthesizer::new());

        let mut ids = Vec::new();
        for i in 0..6 {
            ids.push(submit(&fx, &format!("p{}\n\nq{}", i, i)).await.id().clone());
        }
        for id in &ids {
            assert_eq!(finished(&fx, id).await.state, PipelineRunState::Completed);
        }
    }

    #[tokio::test]
    async fn test_saturated_queue_still_runs_every_document() {
        let gate = Arc::new(Semaphore::new(0));
        let fx = start_with(
            FakeSplitter::new(),
            FakeSynthesizer::with_gate(gate.clone()),
            1,
            1,
        );

        // 第一个文档占住唯一的 worker，后续提交在队列满时等待
        let contents: Vec<String> = (0..4).map(|i| format!("a{}\n\nb{}", i, i)).collect();
        let submissions =
            futures_util::future::join_all(contents.iter().map(|content| submit(&fx, content)));
        let release = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            gate.add_permits(4);
        };
        let (records, _) = tokio::time::timeout(
            Duration::from_secs(5),
            async { tokio::join!(submissions, release) },
        )
        .await
        .unwrap();

        for record in &records {
            assert_eq!(
                finished(&fx, record.id()).await.state,
                PipelineRunState::Completed
            );
            assert_eq!(
                fx.registry.find(record.id()).await.unwrap().status(),
                DocumentStatus::Synthesized
            );
        }
    }

    /// 写出一个段落后失败的拆分器
    struct PartialSplitter;

    #[async_trait]
    impl SplitterPort for PartialSplitter {
        async fn split(&self, _input_file: &Path, output_dir: &Path) -> Result<(), StageError> {
            tokio::fs::write(output_dir.join("1.txt"), "partial").await.unwrap();
            Err(StageError::Failed {
                stage: Stage::Split,
                message: "crashed after first paragraph".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_split_failure_discards_partial_output() {
        let fx = start(PartialSplitter, FakeSynthesizer::new());
        let record = submit(&fx, "text").await;

        let run = finished(&fx, record.id()).await;
        assert_eq!(run.failed_stage, Some(Stage::Split));
        assert_eq!(
            fx.registry.find(record.id()).await.unwrap().status(),
            DocumentStatus::Saved
        );
        assert!(!fx.store.paragraphs_dir(record.id()).exists());

        let paragraphs = FileParagraphStore::new(DocumentLayout::new(fx.dir.path()));
        assert!(paragraphs.list_infos(record.id()).await.unwrap().is_empty());
        assert!(matches!(
            paragraphs.load(record.id(), &ParagraphId::from_ordinal(1)).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
