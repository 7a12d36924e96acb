//! docvoice - 文档拆分与语音合成服务
//!
//! 启动流程: 配置 -> 日志 -> 恢复注册表 -> 启动流水线 Worker -> HTTP 服务

use std::sync::Arc;

use docvoice::application::ports::DocumentStorePort;
use docvoice::config::{load_config, print_config, AppConfig, LogConfig, PipelineBackend};
use docvoice::infrastructure::adapters::stages::{
    CommandSplitter, CommandSynthesizer, FakeSplitter, FakeSynthesizer,
};
use docvoice::infrastructure::adapters::storage::{
    DocumentLayout, FileDocumentStore, FileParagraphStore,
};
use docvoice::infrastructure::http::{AppState, HttpServer, ServerConfig};
use docvoice::infrastructure::memory::{
    InMemoryDocumentRegistry, InMemoryPipelineTracker, RandomIdGenerator,
};
use docvoice::infrastructure::worker::{PipelineWorker, PipelineWorkerConfig, StageBackends};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config.log);

    tracing::info!("docvoice {}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 确保文档目录存在
    tokio::fs::create_dir_all(&config.storage.documents_dir).await?;

    let layout = DocumentLayout::new(&config.storage.documents_dir);
    let document_store = Arc::new(FileDocumentStore::new(layout.clone()));
    let paragraph_store = Arc::new(FileParagraphStore::new(layout));
    let registry = Arc::new(InMemoryDocumentRegistry::new(
        document_store.clone(),
        Arc::new(RandomIdGenerator),
    ));

    // 从磁盘恢复注册表；中断的流水线不会继续执行
    let records = document_store.load_all().await?;
    for record in records.iter().filter(|r| !r.status().is_terminal()) {
        tracing::warn!(
            document_id = %record.id(),
            status = %record.status(),
            "Pipeline not resumed"
        );
    }
    let restored = registry.restore(records).await;
    tracing::info!(documents = restored, "Registry restored");

    // 创建流水线队列与跟踪器
    let (queue_tx, queue_rx) = mpsc::channel(config.pipeline.queue_capacity);
    let tracker = Arc::new(InMemoryPipelineTracker::new(queue_tx));

    // 创建并启动 PipelineWorker
    let worker = PipelineWorker::new(
        PipelineWorkerConfig {
            max_concurrent: config.pipeline.max_concurrent,
        },
        queue_rx,
        registry.clone(),
        document_store,
        tracker.clone(),
        build_stages(&config),
    );
    tokio::spawn(worker.run());

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_upload_size(config.storage.max_upload_size);
    let state = AppState::new(registry, paragraph_store, tracker);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志；RUST_LOG 优先于配置
fn init_logging(log: &LogConfig) {
    let log_filter = format!("{},docvoice={},tower_http=debug", log.level, log.level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

/// 根据配置选择阶段实现
fn build_stages(config: &AppConfig) -> StageBackends {
    let pipeline = &config.pipeline;
    match pipeline.backend {
        PipelineBackend::Command => StageBackends {
            splitter: Arc::new(CommandSplitter::new(
                pipeline.splitter.clone(),
                pipeline.working_dir.clone(),
                pipeline.stage_timeout(),
            )),
            synthesizer: Arc::new(CommandSynthesizer::new(
                pipeline.synthesizer.clone(),
                pipeline.working_dir.clone(),
                pipeline.stage_timeout(),
            )),
        },
        PipelineBackend::Fake => {
            tracing::warn!("Using in-process fake pipeline stages");
            StageBackends {
                splitter: Arc::new(FakeSplitter::new()),
                synthesizer: Arc::new(FakeSynthesizer::new()),
            }
        }
    }
}
