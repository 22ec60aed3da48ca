// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ingestion Orchestrator (C8, §4.8): wires C1 (naming), C3 (chunking),
//! C4 (change detection), C5 (embedding) and C6/C7 (storage) into one
//! scan → chunk → embed → upsert → finalize pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use semscope_changedet::{detect_changes, walk_candidates, CandidateFile, WalkConfig};
use semscope_chunker::{chunk_code, chunk_web_page, ChunkDraft};
use semscope_core::config::{ChunkerConfig, EmbeddingConfig};
use semscope_core::model::{chunk_id, content_hash, Chunk, ChunkSource, IndexedFile};
use semscope_core::scope::{Scope, ScopeResolver};
use semscope_embeddings::{EmbedJobOutcome, Embedder, EmbeddingCoordinator, SparseEncoder};
use semscope_index::{VectorDocument, VectorStore};
use semscope_storage::RelationalStore;
use tokio::sync::mpsc::Sender;

use crate::cancellation::CancellationToken;
use crate::error::IngestError;
use crate::model::{IngestJobResult, IngestPhase, IngestRequest, IngestSource, JobStatus, Provenance, ProgressEvent};

/// One file's worth of chunk drafts, still missing ids/project/dataset.
struct PendingFile {
    relative_path: String,
    language: Option<String>,
    drafts: Vec<ChunkDraft>,
    size: u64,
    content_hash: String,
}

fn chunk_payload(chunk: &Chunk) -> HashMap<String, serde_json::Value> {
    match serde_json::to_value(chunk) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => HashMap::new(),
    }
}

fn draft_to_chunk(
    draft: &ChunkDraft,
    project_id: Uuid,
    dataset_id: Uuid,
    source_type: ChunkSource,
    provenance: &Provenance,
) -> Chunk {
    let file_extension = draft.relative_path.rsplit('.').next().map(str::to_string);
    Chunk {
        id: chunk_id(&draft.relative_path, draft.start_line, draft.end_line, draft.chunk_index, &draft.content),
        project_id,
        dataset_id,
        source_type,
        relative_path: draft.relative_path.clone(),
        start_line: draft.start_line,
        end_line: draft.end_line,
        chunk_index: draft.chunk_index,
        content: draft.content.clone(),
        file_extension,
        language: draft.language.clone(),
        repo: provenance.repo.clone(),
        branch: provenance.branch.clone(),
        sha: provenance.sha.clone(),
        chunk_title: None,
        symbol: draft.symbol.clone(),
        title: None,
        domain: None,
        extra: serde_json::Map::new(),
    }
}

/// Generalizes the teacher's batching/backpressure ingestion loop to the
/// scan → chunk → embed → upsert → finalize pipeline described in §4.8.
/// Generic over the same four external-interface traits C9 is generic
/// over, so a single set of provider implementations serves both.
pub struct IngestionOrchestrator<E, Sp, V, St> {
    embedder: Arc<E>,
    sparse_encoder: Arc<Sp>,
    coordinator: EmbeddingCoordinator<E, Sp>,
    vector_store: Arc<V>,
    relational_store: Arc<St>,
    chunker_cfg: ChunkerConfig,
    embedding_cfg: EmbeddingConfig,
}

impl<E, Sp, V, St> IngestionOrchestrator<E, Sp, V, St>
where
    E: Embedder,
    Sp: SparseEncoder,
    V: VectorStore,
    St: RelationalStore,
{
    pub fn new(
        embedder: Arc<E>,
        sparse_encoder: Arc<Sp>,
        vector_store: Arc<V>,
        relational_store: Arc<St>,
        chunker_cfg: ChunkerConfig,
        embedding_cfg: EmbeddingConfig,
    ) -> Self {
        let coordinator = EmbeddingCoordinator::new(embedder.clone(), sparse_encoder.clone(), embedding_cfg.clone());
        Self {
            embedder,
            sparse_encoder,
            coordinator,
            vector_store,
            relational_store,
            chunker_cfg,
            embedding_cfg,
        }
    }

    /// Single entry point dispatching on [`IngestSource`] (§4.8). Callers
    /// that already know their source kind can call
    /// [`Self::ingest_codebase`]/[`Self::ingest_pages`] directly.
    pub async fn ingest(
        &self,
        req: &IngestRequest,
        source: IngestSource,
        progress: Option<Sender<ProgressEvent>>,
        cancellation: &CancellationToken,
    ) -> Result<IngestJobResult, IngestError> {
        match source {
            IngestSource::Codebase(walk_config) => self.ingest_codebase(req, &walk_config, progress, cancellation).await,
            IngestSource::PageSet(pages) => self.ingest_pages(req, &pages, progress, cancellation).await,
        }
    }

    /// Ingests a codebase path, running the change detector first so
    /// only new/modified files are re-chunked and re-embedded (§4.4,
    /// §4.8). `req.force` bypasses detection and drops the existing
    /// collection before reprocessing everything.
    pub async fn ingest_codebase(
        &self,
        req: &IngestRequest,
        walk_config: &WalkConfig,
        progress: Option<Sender<ProgressEvent>>,
        cancellation: &CancellationToken,
    ) -> Result<IngestJobResult, IngestError> {
        let (project_id, dataset_id, collection_name) = self.resolve_scope(req).await?;

        if req.force {
            self.clear_existing(project_id, dataset_id, &collection_name).await?;
        }

        emit(&progress, IngestPhase::Scanning, 0, 1).await;
        let candidates = walk_candidates(walk_config);
        let indexed = self
            .relational_store
            .get_indexed_files(project_id, dataset_id)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;

        let change_set = detect_changes(&candidates, &indexed);
        if !req.force && change_set.stats.changed_count() == 0 {
            return Ok(IngestJobResult {
                collection_name,
                files_indexed: 0,
                files_skipped: change_set.stats.unchanged_count as usize,
                files_deleted: 0,
                total_chunks: 0,
                status: JobStatus::Completed,
            });
        }

        for path in change_set.deleted.iter().chain(change_set.modified.iter()) {
            self.delete_file(&collection_name, dataset_id, project_id, path).await?;
        }

        let by_path: HashMap<&str, &CandidateFile> =
            candidates.iter().map(|c| (c.relative_path.as_str(), c)).collect();
        let mut to_process: Vec<&CandidateFile> = Vec::new();
        if req.force {
            to_process.extend(candidates.iter());
        } else {
            for path in change_set.new.iter().chain(change_set.modified.iter()) {
                if let Some(candidate) = by_path.get(path.as_str()) {
                    to_process.push(candidate);
                }
            }
        }

        let files_deleted = if req.force { 0 } else { change_set.deleted.len() };
        let outcome = self
            .process_files(req, project_id, dataset_id, &collection_name, &to_process, &progress, cancellation)
            .await?;

        self.relational_store
            .update_collection_metadata(&collection_name, outcome.total_chunks as u64)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;

        emit(&progress, IngestPhase::Finalizing, 1, 1).await;

        Ok(IngestJobResult {
            collection_name,
            files_indexed: outcome.files_indexed,
            files_skipped: if req.force { 0 } else { change_set.stats.unchanged_count as usize },
            files_deleted,
            total_chunks: outcome.total_chunks,
            status: outcome.status,
        })
    }

    /// Ingests a set of web pages. Pages have no filesystem mtime to diff
    /// against, so every page is always reprocessed (§4.8 web-page path);
    /// chunk-id idempotency (§3 invariant 2) still keeps re-upserts of
    /// unchanged pages a no-op from the vector store's point of view.
    pub async fn ingest_pages(
        &self,
        req: &IngestRequest,
        pages: &[crate::model::WebPage],
        progress: Option<Sender<ProgressEvent>>,
        cancellation: &CancellationToken,
    ) -> Result<IngestJobResult, IngestError> {
        let (project_id, dataset_id, collection_name) = self.resolve_scope(req).await?;

        if req.force {
            self.clear_existing(project_id, dataset_id, &collection_name).await?;
        }

        let mut pending = Vec::with_capacity(pages.len());
        for (i, page) in pages.iter().enumerate() {
            emit(&progress, IngestPhase::Chunking, i, pages.len()).await;
            if cancellation.is_cancelled() {
                return Err(IngestError::Cancelled);
            }
            let drafts = chunk_web_page(&page.content, &page.relative_path, &self.chunker_cfg)
                .map_err(|e| IngestError::Validation(e.to_string()))?;
            pending.push(PendingFile {
                relative_path: page.relative_path.clone(),
                language: None,
                drafts,
                size: page.content.len() as u64,
                content_hash: content_hash(page.content.as_bytes()),
            });
        }

        let outcome = self
            .embed_and_upsert(req, project_id, dataset_id, &collection_name, pending, ChunkSource::WebPage, &progress, cancellation)
            .await?;

        self.relational_store
            .update_collection_metadata(&collection_name, outcome.total_chunks as u64)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;

        Ok(IngestJobResult {
            collection_name,
            files_indexed: outcome.files_indexed,
            files_skipped: 0,
            files_deleted: 0,
            total_chunks: outcome.total_chunks,
            status: outcome.status,
        })
    }

    async fn resolve_scope(&self, req: &IngestRequest) -> Result<(Uuid, Uuid, String), IngestError> {
        let project_id = self
            .relational_store
            .get_or_create_project(&req.project)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;
        let dataset_id = self
            .relational_store
            .get_or_create_dataset(Some(project_id), &req.dataset)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;
        let collection_name = ScopeResolver::name_for(Scope::Local, Some(&req.project), Some(&req.dataset));

        let hybrid = self.sparse_encoder.is_enabled();
        if !self.vector_store.has_collection(&collection_name).await.map_err(|e| IngestError::VectorStore(e.to_string()))? {
            self.vector_store
                .create_collection(&collection_name, self.embedder.dimension() as u64, hybrid)
                .await
                .map_err(|e| IngestError::VectorStore(e.to_string()))?;
        }

        // The collection-record row is bookkeeping for C10/status reporting;
        // losing it doesn't make the ingested vectors unreachable, so a
        // failure here is logged loudly rather than aborting the job.
        if let Err(error) = self
            .relational_store
            .get_or_create_collection_record(dataset_id, &collection_name, "qdrant", self.embedder.dimension() as u32, hybrid)
            .await
        {
            tracing::error!(%error, collection = %collection_name, "failed to record collection metadata; continuing ingestion");
        }

        Ok((project_id, dataset_id, collection_name))
    }

    async fn clear_existing(&self, project_id: Uuid, dataset_id: Uuid, collection_name: &str) -> Result<(), IngestError> {
        let existing = self
            .relational_store
            .get_indexed_files(project_id, dataset_id)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;
        for file in &existing {
            self.relational_store
                .delete_indexed_file(project_id, dataset_id, &file.relative_path)
                .await
                .map_err(|e| IngestError::Storage(e.to_string()))?;
        }
        match self.vector_store.drop_collection(collection_name).await {
            Ok(()) => {}
            Err(error) if matches!(error.error_kind(), semscope_core::ErrorKind::NotFound) => {}
            Err(error) => return Err(IngestError::VectorStore(error.to_string())),
        }
        Ok(())
    }

    async fn delete_file(&self, collection_name: &str, dataset_id: Uuid, project_id: Uuid, relative_path: &str) -> Result<(), IngestError> {
        match self.vector_store.delete_by_path(collection_name, &dataset_id.to_string(), relative_path).await {
            Ok(_) => {}
            Err(error) if matches!(error.error_kind(), semscope_core::ErrorKind::NotFound) => {}
            Err(error) => return Err(IngestError::VectorStore(error.to_string())),
        }
        self.relational_store
            .delete_indexed_file(project_id, dataset_id, relative_path)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn process_files(
        &self,
        req: &IngestRequest,
        project_id: Uuid,
        dataset_id: Uuid,
        collection_name: &str,
        files: &[&CandidateFile],
        progress: &Option<Sender<ProgressEvent>>,
        cancellation: &CancellationToken,
    ) -> Result<EmbedOutcome, IngestError> {
        let mut pending = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            emit(progress, IngestPhase::Scanning, i, files.len()).await;
            if cancellation.is_cancelled() {
                return Err(IngestError::Cancelled);
            }
            let content = match std::fs::read_to_string(&file.absolute_path) {
                Ok(c) => c,
                Err(error) => {
                    tracing::warn!(path = %file.relative_path, %error, "skipping unreadable file");
                    continue;
                }
            };
            if content.is_empty() {
                continue;
            }
            let drafts = match chunk_code(&content, &file.relative_path, None, &self.chunker_cfg) {
                Ok(d) => d,
                Err(error) => {
                    tracing::warn!(path = %file.relative_path, %error, "skipping file that failed to chunk");
                    continue;
                }
            };
            let language = drafts.first().and_then(|d| d.language.clone());
            let hash = content_hash(content.as_bytes());
            pending.push(PendingFile {
                relative_path: file.relative_path.clone(),
                language,
                drafts,
                size: file.size,
                content_hash: hash,
            });
        }

        self.embed_and_upsert(req, project_id, dataset_id, collection_name, pending, ChunkSource::Code, progress, cancellation)
            .await
    }

    async fn embed_and_upsert(
        &self,
        req: &IngestRequest,
        project_id: Uuid,
        dataset_id: Uuid,
        collection_name: &str,
        pending: Vec<PendingFile>,
        source_type: ChunkSource,
        progress: &Option<Sender<ProgressEvent>>,
        cancellation: &CancellationToken,
    ) -> Result<EmbedOutcome, IngestError> {
        let want_sparse = self.sparse_encoder.is_enabled();
        let total_files = pending.len();
        let mut files_indexed = 0usize;
        let mut total_chunks = 0usize;
        let mut already_embedded = 0usize;
        let mut hit_limit = false;
        let group_size = self.embedding_cfg.chunk_batch_size.max(1);

        'files: for (file_index, file) in pending.into_iter().enumerate() {
            emit(progress, IngestPhase::Embedding, file_index, total_files).await;
            if cancellation.is_cancelled() {
                return Err(IngestError::Cancelled);
            }
            if hit_limit {
                break;
            }

            let chunks: Vec<Chunk> = file
                .drafts
                .iter()
                .map(|d| draft_to_chunk(d, project_id, dataset_id, source_type, &req.provenance))
                .collect();

            let mut file_docs = Vec::with_capacity(chunks.len());
            for group in file.drafts.chunks(group_size) {
                if cancellation.is_cancelled() {
                    return Err(IngestError::Cancelled);
                }
                let outcome = match self.coordinator.embed_job(group, want_sparse, already_embedded).await {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        tracing::warn!(path = %file.relative_path, %error, "batch embedding failed; discarding batch");
                        continue;
                    }
                };

                let (dense, sparse, group_embedded, limit_reached) = match outcome {
                    EmbedJobOutcome::Completed { dense, sparse } => {
                        let embedded = dense.len();
                        (dense, sparse, embedded, false)
                    }
                    EmbedJobOutcome::LimitReached { dense, sparse, embedded_count } => {
                        (dense, sparse, embedded_count.saturating_sub(already_embedded), true)
                    }
                };
                already_embedded += group_embedded;

                let base = file_docs.len();
                for (offset, dense_vec) in dense.into_iter().enumerate() {
                    let idx = base + offset;
                    if idx >= chunks.len() {
                        break;
                    }
                    let sparse_vec = sparse.as_ref().and_then(|s| s.get(offset)).cloned();
                    file_docs.push(VectorDocument {
                        id: chunks[idx].id.clone(),
                        dense: dense_vec,
                        sparse: sparse_vec,
                        payload: chunk_payload(&chunks[idx]),
                    });
                }

                if limit_reached {
                    hit_limit = true;
                    break;
                }
            }

            if file_docs.is_empty() {
                continue 'files;
            }

            let upsert_result = if want_sparse {
                self.vector_store.insert_hybrid(collection_name, &file_docs).await
            } else {
                self.vector_store.insert(collection_name, &file_docs).await
            };
            if let Err(error) = upsert_result {
                tracing::warn!(path = %file.relative_path, %error, "failed to upsert file's chunks; skipping");
                continue;
            }

            total_chunks += file_docs.len();
            files_indexed += 1;

            let indexed_row = IndexedFile {
                project_id,
                dataset_id,
                relative_path: file.relative_path.clone(),
                content_hash: file.content_hash.clone(),
                file_size: file.size,
                chunk_count: file_docs.len() as u32,
                last_indexed_at: Utc::now(),
                language: file.language.clone(),
            };
            if let Err(error) = self.relational_store.insert_indexed_files(&[indexed_row]).await {
                tracing::warn!(path = %file.relative_path, %error, "failed to record indexed file");
            }
        }

        Ok(EmbedOutcome {
            files_indexed,
            total_chunks,
            status: if hit_limit { JobStatus::LimitReached } else { JobStatus::Completed },
        })
    }
}

async fn emit(progress: &Option<Sender<ProgressEvent>>, phase: IngestPhase, current: usize, total: usize) {
    if let Some(sender) = progress {
        let _ = sender.send(ProgressEvent { phase, current, total }).await;
    }
}

struct EmbedOutcome {
    files_indexed: usize,
    total_chunks: usize,
    status: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semscope_core::{Collection, Dataset, SparseVector};
    use semscope_embeddings::EmbeddingError;
    use semscope_index::{FusionMethod, IndexError, SearchHit, SearchParams};
    use semscope_storage::StorageError;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![0.1, 0.2])
        }
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![0.1, 0.2]).collect())
        }
        fn dimension(&self) -> usize {
            2
        }
    }

    struct FakeSparse {
        enabled: bool,
    }

    #[async_trait]
    impl SparseEncoder for FakeSparse {
        async fn compute_sparse(&self, _text: &str) -> Result<SparseVector, EmbeddingError> {
            Ok(SparseVector { indices: vec![0], values: vec![1.0] })
        }
        async fn compute_sparse_batch(&self, texts: &[&str]) -> Result<Vec<SparseVector>, EmbeddingError> {
            Ok(texts.iter().map(|_| SparseVector { indices: vec![0], values: vec![1.0] }).collect())
        }
        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[derive(Default)]
    struct FakeVectorStore {
        collections: Mutex<std::collections::HashSet<String>>,
        docs: Mutex<Vec<(String, VectorDocument)>>,
    }

    #[async_trait]
    impl VectorStore for FakeVectorStore {
        async fn has_collection(&self, name: &str) -> Result<bool, IndexError> {
            Ok(self.collections.lock().unwrap().contains(name))
        }
        async fn create_collection(&self, name: &str, _dimension: u64, _hybrid: bool) -> Result<(), IndexError> {
            self.collections.lock().unwrap().insert(name.to_string());
            Ok(())
        }
        async fn drop_collection(&self, name: &str) -> Result<(), IndexError> {
            self.collections.lock().unwrap().remove(name);
            self.docs.lock().unwrap().retain(|(c, _)| c != name);
            Ok(())
        }
        async fn insert(&self, name: &str, docs: &[VectorDocument]) -> Result<(), IndexError> {
            let mut guard = self.docs.lock().unwrap();
            for d in docs {
                guard.push((name.to_string(), d.clone()));
            }
            Ok(())
        }
        async fn insert_hybrid(&self, name: &str, docs: &[VectorDocument]) -> Result<(), IndexError> {
            self.insert(name, docs).await
        }
        async fn search(&self, _name: &str, _dense: &[f32], _params: &SearchParams) -> Result<Vec<SearchHit>, IndexError> {
            Ok(Vec::new())
        }
        async fn hybrid_query(
            &self,
            _name: &str,
            _dense: &[f32],
            _sparse: &SparseVector,
            _params: &SearchParams,
            _fusion: FusionMethod,
        ) -> Result<Vec<SearchHit>, IndexError> {
            Ok(Vec::new())
        }
        async fn delete_by_dataset(&self, name: &str, dataset_id: &str) -> Result<u64, IndexError> {
            let mut guard = self.docs.lock().unwrap();
            let before = guard.len();
            guard.retain(|(c, d)| !(c == name && payload_dataset(d) == dataset_id));
            Ok((before - guard.len()) as u64)
        }
        async fn delete_by_path(&self, name: &str, dataset_id: &str, relative_path: &str) -> Result<u64, IndexError> {
            let mut guard = self.docs.lock().unwrap();
            let before = guard.len();
            guard.retain(|(c, d)| {
                !(c == name && payload_dataset(d) == dataset_id && payload_path(d) == relative_path)
            });
            Ok((before - guard.len()) as u64)
        }
        async fn list_collections(&self) -> Result<Vec<String>, IndexError> {
            Ok(self.collections.lock().unwrap().iter().cloned().collect())
        }
    }

    fn payload_dataset(doc: &VectorDocument) -> String {
        doc.payload.get("dataset_id").and_then(|v| v.as_str()).unwrap_or_default().to_string()
    }

    fn payload_path(doc: &VectorDocument) -> String {
        doc.payload.get("relative_path").and_then(|v| v.as_str()).unwrap_or_default().to_string()
    }

    #[derive(Default)]
    struct FakeStorage {
        indexed: Mutex<Vec<IndexedFile>>,
    }

    #[async_trait]
    impl RelationalStore for FakeStorage {
        async fn get_or_create_project(&self, _name: &str) -> Result<Uuid, StorageError> {
            Ok(Uuid::nil())
        }
        async fn get_or_create_dataset(&self, _project_id: Option<Uuid>, _name: &str) -> Result<Uuid, StorageError> {
            Ok(Uuid::nil())
        }
        async fn list_datasets_for_project(&self, _project_id: Uuid) -> Result<Vec<Dataset>, StorageError> {
            Ok(Vec::new())
        }
        async fn list_global_datasets(&self) -> Result<Vec<Dataset>, StorageError> {
            Ok(Vec::new())
        }
        async fn get_or_create_collection_record(
            &self,
            _dataset_id: Uuid,
            _name: &str,
            _backend: &str,
            _dimension: u32,
            _hybrid: bool,
        ) -> Result<Uuid, StorageError> {
            Ok(Uuid::nil())
        }
        async fn update_collection_metadata(&self, _name: &str, _point_count: u64) -> Result<(), StorageError> {
            Ok(())
        }
        async fn resolve_collections_for(&self, _dataset_ids: &[Uuid]) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
        async fn get_collection_by_dataset(&self, _dataset_id: Uuid) -> Result<Option<Collection>, StorageError> {
            Ok(None)
        }
        async fn insert_indexed_files(&self, rows: &[IndexedFile]) -> Result<(), StorageError> {
            let mut guard = self.indexed.lock().unwrap();
            for row in rows {
                guard.retain(|f| f.relative_path != row.relative_path);
                guard.push(row.clone());
            }
            Ok(())
        }
        async fn delete_indexed_file(&self, _project_id: Uuid, _dataset_id: Uuid, relative_path: &str) -> Result<(), StorageError> {
            self.indexed.lock().unwrap().retain(|f| f.relative_path != relative_path);
            Ok(())
        }
        async fn get_indexed_files(&self, _project_id: Uuid, _dataset_id: Uuid) -> Result<Vec<IndexedFile>, StorageError> {
            Ok(self.indexed.lock().unwrap().clone())
        }
        async fn count_indexed_files(&self, _project_id: Uuid, _dataset_id: Uuid) -> Result<i64, StorageError> {
            Ok(self.indexed.lock().unwrap().len() as i64)
        }
        async fn clear_dataset(&self, _dataset_id: Uuid) -> Result<(), StorageError> {
            self.indexed.lock().unwrap().clear();
            Ok(())
        }
    }

    fn orchestrator(sparse_enabled: bool) -> IngestionOrchestrator<FakeEmbedder, FakeSparse, FakeVectorStore, FakeStorage> {
        IngestionOrchestrator::new(
            Arc::new(FakeEmbedder),
            Arc::new(FakeSparse { enabled: sparse_enabled }),
            Arc::new(FakeVectorStore::default()),
            Arc::new(FakeStorage::default()),
            ChunkerConfig::default(),
            EmbeddingConfig { batch_size: 10, chunk_batch_size: 4, max_concurrent_batches: 1, max_chunks_per_job: 1000 },
        )
    }

    fn req(force: bool) -> IngestRequest {
        IngestRequest {
            project: "acme".to_string(),
            dataset: "main".to_string(),
            provenance: Provenance::default(),
            force,
        }
    }

    #[tokio::test]
    async fn ingests_a_fresh_codebase_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        std::fs::write(dir.path().join("b.rs"), "fn b() {}\n").unwrap();

        let orch = orchestrator(false);
        let walk_config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let token = CancellationToken::new();
        let result = orch.ingest_codebase(&req(false), &walk_config, None, &token).await.unwrap();

        assert_eq!(result.files_indexed, 2);
        assert_eq!(result.status, JobStatus::Completed);
        assert!(result.total_chunks >= 2);
    }

    #[tokio::test]
    async fn unchanged_tree_is_skipped_on_second_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();

        let orch = orchestrator(false);
        let walk_config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let token = CancellationToken::new();
        orch.ingest_codebase(&req(false), &walk_config, None, &token).await.unwrap();
        let second = orch.ingest_codebase(&req(false), &walk_config, None, &token).await.unwrap();

        assert_eq!(second.files_indexed, 0);
        assert_eq!(second.files_skipped, 1);
    }

    #[tokio::test]
    async fn force_reingest_reprocesses_every_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();

        let orch = orchestrator(false);
        let walk_config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let token = CancellationToken::new();
        orch.ingest_codebase(&req(false), &walk_config, None, &token).await.unwrap();
        let forced = orch.ingest_codebase(&req(true), &walk_config, None, &token).await.unwrap();

        assert_eq!(forced.files_indexed, 1);
    }

    #[tokio::test]
    async fn already_cancelled_token_aborts_before_embedding() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();

        let orch = orchestrator(false);
        let walk_config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let token = CancellationToken::new();
        token.cancel();
        let result = orch.ingest_codebase(&req(false), &walk_config, None, &token).await;
        assert!(matches!(result, Err(IngestError::Cancelled)));
    }

    #[tokio::test]
    async fn ingests_web_pages_with_hybrid_vectors() {
        let orch = orchestrator(true);
        let pages = vec![crate::model::WebPage {
            relative_path: "docs/intro.md".to_string(),
            content: "# Intro\n\nSome prose describing the product.\n".to_string(),
        }];
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(16);
        let result = orch.ingest_pages(&req(false), &pages, Some(tx), &token).await.unwrap();

        assert_eq!(result.files_indexed, 1);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn deleted_files_are_removed_from_vector_store_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "fn a() {}\n").unwrap();

        let orch = orchestrator(false);
        let walk_config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let token = CancellationToken::new();
        orch.ingest_codebase(&req(false), &walk_config, None, &token).await.unwrap();

        std::fs::remove_file(&path).unwrap();
        let result = orch.ingest_codebase(&req(false), &walk_config, None, &token).await.unwrap();
        assert_eq!(result.files_deleted, 1);

        let remaining = orch
            .relational_store
            .get_indexed_files(Uuid::nil(), Uuid::nil())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
