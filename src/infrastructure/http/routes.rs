//! HTTP Routes
//!
//! API Endpoints:
//! - /ping                                         GET   健康检查
//! - /documents                                    GET   文档列表
//! - /documents                                    POST  上传文档（multipart: name, file）
//! - /documents/:id                                GET   文档详情
//! - /documents/:id/pipeline                       GET   流水线运行记录
//! - /documents/:id/paragraphs/:spec               GET   单个段落 / 批量段落
//! - /documents/:id/paragraphs/:paragraph_id/audio GET   段落音频
//!
//! 已知路径上的其他方法返回 405，未匹配的路径返回 404。

use axum::{routing::get, Router};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .merge(document_routes())
        .fallback(handlers::not_found)
}

/// Document 路由
fn document_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/documents",
            get(handlers::list_documents).post(handlers::upload_document),
        )
        .route("/documents/:id", get(handlers::get_document))
        .route("/documents/:id/pipeline", get(handlers::get_pipeline_run))
        .route("/documents/:id/paragraphs/:spec", get(handlers::get_paragraphs))
        .route(
            "/documents/:id/paragraphs/:paragraph_id/audio",
            get(handlers::get_paragraph_audio),
        )
}

#[cfg(test)]
mod tests {
    use crate::application::ports::{
        PipelineRun, PipelineRunState, SplitterPort, SynthesizerPort,
    };
    use crate::domain::document::DocumentId;
    use crate::infrastructure::adapters::stages::{FakeSplitter, FakeSynthesizer};
    use crate::infrastructure::adapters::storage::{
        DocumentLayout, FileDocumentStore, FileParagraphStore,
    };
    use crate::infrastructure::http::{build_router, AppState};
    use crate::infrastructure::memory::{
        InMemoryDocumentRegistry, InMemoryPipelineTracker, RandomIdGenerator,
    };
    use crate::infrastructure::worker::{PipelineWorker, PipelineWorkerConfig, StageBackends};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::{mpsc, Semaphore};
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "docvoice-test-boundary";
    const UPLOAD_LIMIT: usize = 64 * 1024;

    struct TestApp {
        _dir: TempDir,
        router: Router,
        state: Arc<AppState>,
    }

    fn spawn_app(
        splitter: impl SplitterPort + 'static,
        synthesizer: impl SynthesizerPort + 'static,
    ) -> TestApp {
        let dir = tempdir().unwrap();
        let layout = DocumentLayout::new(dir.path());
        let store = Arc::new(FileDocumentStore::new(layout.clone()));
        let registry = Arc::new(InMemoryDocumentRegistry::new(
            store.clone(),
            Arc::new(RandomIdGenerator),
        ));
        let paragraphs = Arc::new(FileParagraphStore::new(layout));
        let (tx, rx) = mpsc::channel(16);
        let tracker = Arc::new(InMemoryPipelineTracker::new(tx));

        let worker = PipelineWorker::new(
            PipelineWorkerConfig::default(),
            rx,
            registry.clone(),
            store,
            tracker.clone(),
            StageBackends {
                splitter: Arc::new(splitter),
                synthesizer: Arc::new(synthesizer),
            },
        );
        tokio::spawn(worker.run());

        let state = Arc::new(AppState::new(registry, paragraphs, tracker));
        TestApp {
            _dir: dir,
            router: build_router(state.clone(), UPLOAD_LIMIT),
            state,
        }
    }

    fn multipart_body(name: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(name) = name {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{}\r\n",
                    BOUNDARY, name
                )
                .as_bytes(),
            );
        }
        if let Some((filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    impl TestApp {
        async fn send(&self, request: Request<Body>) -> (StatusCode, header::HeaderMap, Vec<u8>) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, headers, body.to_vec())
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, _, body) = self.send(request).await;
            let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, json)
        }

        async fn upload(&self, name: Option<&str>, file: Option<(&str, &[u8])>) -> (StatusCode, Value) {
            let request = Request::builder()
                .method("POST")
                .uri("/documents")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(name, file)))
                .unwrap();
            let (status, _, body) = self.send(request).await;
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }

        async fn wait_for(&self, id: &str, mut done: impl FnMut(&PipelineRun) -> bool) -> PipelineRun {
            let id = DocumentId::parse(id).unwrap();
            let mut updates = self.state.scheduler.subscribe(&id).unwrap();
            let run = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(|r| done(r)))
                .await
                .unwrap()
                .unwrap()
                .clone();
            run
        }
    }

    #[tokio::test]
    async fn test_upload_split_then_synthesize() {
        let gate = Arc::new(Semaphore::new(0));
        let app = spawn_app(FakeSplitter::new(), FakeSynthesizer::with_gate(gate.clone()));
        let content = b"First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";

        let (status, record) = app.upload(Some("Story"), Some(("story.txt", &content[..]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["status"], "saved");
        assert_eq!(record["size"], content.len());
        assert_eq!(record["extension"], "txt");
        assert_eq!(record["sha1sum"].as_str().unwrap().len(), 40);
        let id = record["id"].as_str().unwrap().to_string();
        assert_eq!(record["link"], format!("/documents/{}", id));

        // 合成被 gate 挡住，此时应处于 split
        app.wait_for(&id, |run| run.state == PipelineRunState::Synthesizing)
            .await;
        let (status, detail) = app.get(&format!("/documents/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["status"], "split");
        let paragraphs = detail["paragraphs"].as_array().unwrap();
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(
            paragraphs[0]["audioLink"],
            format!("/documents/{}/paragraphs/1/audio", id)
        );
        let (status, _) = app.get(&format!("/documents/{}/paragraphs/1/audio", id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        gate.add_permits(1);
        let run = app.wait_for(&id, |run| run.state.is_finished()).await;
        assert_eq!(run.state, PipelineRunState::Completed);

        let (_, detail) = app.get(&format!("/documents/{}", id)).await;
        assert_eq!(detail["status"], "synthesized");

        for i in 1..=3 {
            let request = Request::builder()
                .uri(format!("/documents/{}/paragraphs/{}/audio", id, i))
                .body(Body::empty())
                .unwrap();
            let (status, headers, body) = app.send(request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
            assert_eq!(headers[header::CONTENT_LENGTH], body.len().to_string().as_str());
            assert_eq!(&body[0..4], b"RIFF");
        }

        let (_, run) = app.get(&format!("/documents/{}/pipeline", id)).await;
        assert_eq!(run["state"], "completed");
        assert_eq!(run["documentId"], id.as_str());
    }

    #[tokio::test]
    async fn test_split_failure_keeps_saved() {
        let app = spawn_app(FakeSplitter::failing(), FakeSynthesizer::new());

        let (status, record) = app.upload(Some("Broken"), Some(("b.txt", &b"text"[..]))).await;
        assert_eq!(status, StatusCode::OK);
        let id = record["id"].as_str().unwrap().to_string();

        let run = app.wait_for(&id, |run| run.state.is_finished()).await;
        assert_eq!(run.state, PipelineRunState::Failed);

        let (_, detail) = app.get(&format!("/documents/{}", id)).await;
        assert_eq!(detail["status"], "saved");
        assert!(detail["paragraphs"].as_array().unwrap().is_empty());

        let (status, body) = app.get(&format!("/documents/{}/paragraphs/1", id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errno"], 404);

        let (_, run) = app.get(&format!("/documents/{}/pipeline", id)).await;
        assert_eq!(run["state"], "failed");
        assert_eq!(run["failedStage"], "split");
    }

    #[tokio::test]
    async fn test_paragraph_queries() {
        let app = spawn_app(FakeSplitter::new(), FakeSynthesizer::new());
        let content = (1..=12)
            .map(|i| format!("paragraph {}", i))
            .collect::<Vec<_>>()
            .join("\n\n");

        let (_, record) = app.upload(Some("Long"), Some(("long.md", content.as_bytes()))).await;
        let id = record["id"].as_str().unwrap().to_string();
        app.wait_for(&id, |run| run.state.is_finished()).await;

        let (status, paragraph) = app.get(&format!("/documents/{}/paragraphs/2", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paragraph["id"], "2");
        assert_eq!(paragraph["content"], "paragraph 2");
        assert_eq!(paragraph["link"], format!("/documents/{}/paragraphs/2", id));

        let (status, batch) = app
            .get(&format!("/documents/{}/paragraphs/10-11,2,99,1-2", id))
            .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = batch
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "10", "11"]);

        let (status, empty) = app.get(&format!("/documents/{}/paragraphs/5-3", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(empty.as_array().unwrap().is_empty());

        for bad in ["a-3", "1-2-3", "1-20000"] {
            let (status, body) = app.get(&format!("/documents/{}/paragraphs/{}", id, bad)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "selector {}", bad);
            assert_eq!(body["errno"], 400);
        }

        for unsafe_id in ["..", "a%5Cb"] {
            let (status, body) = app
                .get(&format!("/documents/{}/paragraphs/{}", id, unsafe_id))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "paragraph id {}", unsafe_id);
            assert_eq!(body["errno"], 400);
        }

        let (_, list) = app.get("/documents").await;
        assert_eq!(list["link"], "/documents");
        assert_eq!(list["documents"].as_array().unwrap().len(), 1);
        assert!(list["documents"][0].get("paragraphs").is_none());
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let app = spawn_app(FakeSplitter::new(), FakeSynthesizer::new());

        let (status, body) = app.upload(None, Some(("a.txt", &b"data"[..]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errno"], 400);

        let (status, _) = app.upload(Some("   "), Some(("a.txt", &b"data"[..]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.upload(Some("No file"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let big = vec![b'x'; UPLOAD_LIMIT * 2];
        let (status, _) = app.upload(Some("Big"), Some(("big.txt", big.as_slice()))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let (_, list) = app.get("/documents").await;
        assert!(list["documents"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_routes_and_methods() {
        let app = spawn_app(FakeSplitter::new(), FakeSynthesizer::new());
        let (_, record) = app.upload(Some("Doc"), Some(("d.txt", &b"x"[..]))).await;
        let id = record["id"].as_str().unwrap().to_string();

        for (method, uri) in [
            ("DELETE", "/documents".to_string()),
            ("PUT", format!("/documents/{}", id)),
            ("POST", format!("/documents/{}/paragraphs/1", id)),
            ("DELETE", format!("/documents/{}/paragraphs/1/audio", id)),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(&uri)
                .body(Body::empty())
                .unwrap();
            let (status, _, _) = app.send(request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        }

        for uri in [
            format!("/documents/{}/unknown", id),
            format!("/documents/{}/paragraphs/1/audio/extra", id),
            "/nothing".to_string(),
        ] {
            let (status, _) = app.get(&uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }

        let unknown = "0123456789abcdef0123456789abcdef";
        let (status, _) = app.get(&format!("/documents/{}", unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.get(&format!("/documents/{}/paragraphs/1", unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.get("/documents/not-an-id/paragraphs/1/audio").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ping() {
        let app = spawn_app(FakeSplitter::new(), FakeSynthesizer::new());
        let (status, body) = app.get("/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
