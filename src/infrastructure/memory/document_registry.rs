//! In-Memory Document Registry Implementation

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::application::ports::{
    DocumentRegistryPort, DocumentStorePort, IdGenerator, RegistryError, StoreError,
};
use crate::domain::document::{DocumentId, DocumentName, DocumentRecord, DocumentStatus};

/// 生成 ID 的默认最大尝试次数
pub const DEFAULT_MAX_ATTEMPTS: usize = 16;

/// 基于 UUID v4 的随机 ID 生成器
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> DocumentId {
        DocumentId::from_bytes(*Uuid::new_v4().as_bytes())
    }
}

#[derive(Default)]
struct RegistryState {
    /// 插入顺序
    records: Vec<DocumentRecord>,
    /// id -> records 下标
    index: HashMap<DocumentId, usize>,
    /// 已分配但尚未注册完成的 ID
    reserved: HashSet<DocumentId>,
}

impl RegistryState {
    fn is_taken(&self, id: &DocumentId) -> bool {
        self.index.contains_key(id) || self.reserved.contains(id)
    }

    fn insert(&mut self, record: DocumentRecord) -> bool {
        if self.index.contains_key(record.id()) {
            return false;
        }
        self.index.insert(record.id().clone(), self.records.len());
        self.records.push(record);
        true
    }
}

/// 内存文档注册表
///
/// 记录的唯一权威副本，读写都经过同一把锁。
/// 状态变更先写 index.json 再修改内存，持久化失败时内存不变。
/// 写盘期间只持有该文档的写锁，不阻塞其他读者。
pub struct InMemoryDocumentRegistry {
    state: RwLock<RegistryState>,
    /// 每个文档一把状态写锁，串行化同一文档的 读-写盘-提交
    status_locks: DashMap<DocumentId, Arc<Mutex<()>>>,
    store: Arc<dyn DocumentStorePort>,
    id_generator: Arc<dyn IdGenerator>,
    max_attempts: usize,
}

impl InMemoryDocumentRegistry {
    pub fn new(store: Arc<dyn DocumentStorePort>, id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            status_locks: DashMap::new(),
            store,
            id_generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// 启动时载入已持久化的记录，返回载入数量
    pub async fn restore(&self, records: Vec<DocumentRecord>) -> usize {
        let mut state = self.state.write().await;
        let mut restored = 0;
        for record in records {
            let id = record.id().clone();
            if state.insert(record) {
                restored += 1;
            } else {
                tracing::warn!(document_id = %id, "Duplicate document skipped during restore");
            }
        }
        restored
    }

    fn next_free_id(&self, state: &RegistryState) -> Result<DocumentId, RegistryError> {
        for attempt in 1..=self.max_attempts {
            let id = self.id_generator.generate();
            if !state.is_taken(&id) {
                return Ok(id);
            }
            tracing::debug!(document_id = %id, attempt, "Document id collision");
        }
        Err(RegistryError::CollisionExhausted {
            attempts: self.max_attempts,
        })
    }

    fn status_lock(&self, id: &DocumentId) -> Arc<Mutex<()>> {
        self.status_locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn persist_new(
        &self,
        id: DocumentId,
        name: DocumentName,
        filename: Option<String>,
        data: &[u8],
    ) -> Result<DocumentRecord, RegistryError> {
        let mut record = DocumentRecord::new(id.clone(), name, filename.as_deref(), data);
        record.advance(DocumentStatus::Saved)?;

        match self.store.persist(&record, data).await {
            Ok(()) => Ok(record),
            Err(StoreError::AlreadyExists(_)) => Err(RegistryError::Conflict(id)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DocumentRegistryPort for InMemoryDocumentRegistry {
    async fn generate_id(&self) -> Result<DocumentId, RegistryError> {
        let state = self.state.read().await;
        self.next_free_id(&state)
    }

    async fn create(
        &self,
        name: DocumentName,
        filename: Option<String>,
        data: &[u8],
    ) -> Result<DocumentRecord, RegistryError> {
        let id = {
            let mut state = self.state.write().await;
            let id = self.next_free_id(&state)?;
            state.reserved.insert(id.clone());
            id
        };

        // 落盘期间不持锁，其他请求可以并发读取与创建
        let result = self.persist_new(id.clone(), name, filename, data).await;

        let mut state = self.state.write().await;
        state.reserved.remove(&id);
        let record = result?;
        state.insert(record.clone());

        tracing::debug!(document_id = %id, total = state.records.len(), "Document registered");
        Ok(record)
    }

    async fn find(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        let state = self.state.read().await;
        state
            .index
            .get(id)
            .map(|&pos| state.records[pos].clone())
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    async fn list(&self) -> Vec<DocumentRecord> {
        self.state.read().await.records.clone()
    }

    async fn update_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
    ) -> Result<DocumentRecord, RegistryError> {
        let lock = self.status_lock(id);
        let _guard = lock.lock().await;

        // 持有文档写锁期间，该记录只会被本次调用修改
        let (pos, current) = {
            let state = self.state.read().await;
            let pos = *state
                .index
                .get(id)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            (pos, state.records[pos].clone())
        };

        let next = current.advanced(status)?;
        self.store.save_index(&next).await?;

        let old_status = current.status();
        self.state.write().await.records[pos] = next.clone();

        tracing::debug!(
            document_id = %id,
            old_status = %old_status,
            new_status = %status,
            "Document status changed"
        );
        Ok(next)
    }
}
