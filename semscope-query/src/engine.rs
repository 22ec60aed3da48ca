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

//! Hybrid Query Engine (C9, §4.9): a state-free, 9-step pipeline from a
//! caller's query down to a ranked, explainable response. Generalizes
//! the teacher's single-index `SemanticSearchEngine<P, I, S>` to fan out
//! across every collection the resolved datasets touch, fuse dense and
//! sparse signal, and optionally rerank with a cross-encoder.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use semscope_core::config::QueryConfig;
use semscope_core::pattern::DatasetPatternResolver;
use semscope_core::scope::ScopeResolver;
use semscope_core::is_all_sentinel;
use semscope_embeddings::{Embedder, SparseEncoder};
use semscope_index::{FusionMethod, SearchFilter, SearchHit, SearchParams, VectorStore};
use semscope_storage::RelationalStore;

use crate::cache::QueryEmbeddingCache;
use crate::error::QueryError;
use crate::model::{
    LineSpan, QueryRequest, QueryResponse, QueryResult, QueryScope, ResponseMetadata,
    RetrievalMethod, ScoreBreakdown, SearchParamsSummary, TimingMs,
};
use crate::reranker::Reranker;

/// Used when a request carries no explicit `top_k` (§13 open question:
/// the spec does not name a bare default, only that `final_k` defaults
/// to the caller's `top_k`).
const DEFAULT_TOP_K: usize = 10;

struct Candidate {
    hit: SearchHit,
    rerank_score: Option<f32>,
}

fn payload_str(payload: &HashMap<String, serde_json::Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn payload_u32(payload: &HashMap<String, serde_json::Value>, key: &str) -> Option<u32> {
    payload.get(key).and_then(|v| v.as_u64()).map(|n| n as u32)
}

fn payload_uuid(payload: &HashMap<String, serde_json::Value>, key: &str) -> Option<Uuid> {
    payload_str(payload, key).and_then(|s| Uuid::parse_str(&s).ok())
}

fn build_rerank_text(hit: &SearchHit, max_chars: usize) -> String {
    let relative_path = payload_str(&hit.payload, "relative_path").unwrap_or_default();
    let content = payload_str(&hit.payload, "content").unwrap_or_default();
    format!("{relative_path}\n{content}").chars().take(max_chars).collect()
}

fn empty_response(message: impl Into<String>, initial_k: usize, final_k: usize) -> QueryResponse {
    QueryResponse {
        results: Vec::new(),
        metadata: ResponseMetadata {
            retrieval_method: RetrievalMethod::Dense,
            timing_ms: TimingMs::default(),
            features_used: Vec::new(),
            search_params: SearchParamsSummary { initial_k, final_k, dense_weight: None, sparse_weight: None },
        },
        message: message.into(),
    }
}

/// Hybrid Query Engine (C9). Generic over the four external-interface
/// traits so callers can plug in any embedder/vector store/relational
/// store/reranker implementation (§6).
pub struct HybridQueryEngine<E, Sp, V, St, Rr> {
    embedder: Arc<E>,
    sparse_encoder: Arc<Sp>,
    vector_store: Arc<V>,
    relational_store: Arc<St>,
    reranker: Arc<Rr>,
    cfg: QueryConfig,
    query_cache: QueryEmbeddingCache,
}

impl<E, Sp, V, St, Rr> HybridQueryEngine<E, Sp, V, St, Rr>
where
    E: Embedder,
    Sp: SparseEncoder,
    V: VectorStore,
    St: RelationalStore,
    Rr: Reranker,
{
    pub fn new(
        embedder: Arc<E>,
        sparse_encoder: Arc<Sp>,
        vector_store: Arc<V>,
        relational_store: Arc<St>,
        reranker: Arc<Rr>,
        cfg: QueryConfig,
    ) -> Self {
        Self {
            embedder,
            sparse_encoder,
            vector_store,
            relational_store,
            reranker,
            cfg,
            query_cache: QueryEmbeddingCache::default(),
        }
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.query_cache.entry_count()
    }

    pub fn clear_cache(&self) {
        self.query_cache.invalidate_all();
    }

    /// Runs the full 9-step pipeline (§4.9).
    pub async fn search(&self, req: QueryRequest, scope: QueryScope) -> Result<QueryResponse, QueryError> {
        let total_start = Instant::now();

        if req.query.trim().is_empty() {
            return Err(QueryError::Validation("query must not be empty".to_string()));
        }

        // Step 1: scope resolution.
        let accessible_ids: Vec<Uuid> = if is_all_sentinel(&req.project) {
            ScopeResolver::all_datasets(&scope.datasets, req.include_global)
        } else {
            let project_id = scope
                .project_id
                .ok_or_else(|| QueryError::Validation("project_id is required to resolve scope".to_string()))?;
            ScopeResolver::accessible_datasets(project_id, &scope.datasets, &scope.shares, req.include_global, Utc::now())
        };

        let top_k = req.top_k.unwrap_or(DEFAULT_TOP_K);
        let initial_k = if self.cfg.enable_reranking { self.cfg.rerank_initial_k } else { top_k };

        // Step 2: dataset expansion.
        let id_to_name: HashMap<Uuid, &str> =
            scope.datasets.iter().map(|d| (d.id, d.name.as_str())).collect();
        let accessible_names: Vec<String> = accessible_ids
            .iter()
            .filter_map(|id| id_to_name.get(id).map(|n| n.to_string()))
            .collect();

        let (resolved_names, diagnostics) =
            DatasetPatternResolver::resolve(req.dataset_selector.as_ref(), &accessible_names);
        if resolved_names.is_empty() {
            let message = diagnostics
                .map(|d| d.reason)
                .unwrap_or_else(|| "no accessible datasets matched the request".to_string());
            return Ok(empty_response(message, initial_k, top_k));
        }

        let name_to_id: HashMap<&str, Uuid> = scope
            .datasets
            .iter()
            .filter(|d| accessible_ids.contains(&d.id))
            .map(|d| (d.name.as_str(), d.id))
            .collect();
        let selected_ids: Vec<Uuid> = resolved_names
            .iter()
            .filter_map(|name| name_to_id.get(name.as_str()).copied())
            .collect();

        // Step 3: query embedding (dense + optional sparse, concurrently).
        let embed_start = Instant::now();
        let cached_dense = self.query_cache.get(&req.query);
        let want_sparse = self.cfg.enable_hybrid_search && self.sparse_encoder.is_enabled();
        let query_text = req.query.as_str();

        let (dense_result, sparse_result) = tokio::join!(
            async {
                match &cached_dense {
                    Some(v) => Ok(v.clone()),
                    None => self.embedder.embed(query_text).await,
                }
            },
            async {
                if want_sparse {
                    Some(self.sparse_encoder.compute_sparse(query_text).await)
                } else {
                    None
                }
            }
        );

        let dense = dense_result.map_err(|e| QueryError::Embedding(e.to_string()))?;
        if cached_dense.is_none() {
            self.query_cache.insert(&req.query, dense.clone());
        }
        let sparse = match sparse_result {
            Some(Ok(vector)) if vector.is_valid() && !vector.indices.is_empty() => Some(vector),
            Some(Ok(_)) => None,
            Some(Err(error)) => {
                tracing::warn!(%error, "sparse query embedding failed; degrading to dense-only");
                None
            }
            None => None,
        };
        let embedding_ms = embed_start.elapsed().as_millis() as u64;
        let hybrid_active = want_sparse && sparse.is_some();

        // Step 4: collection discovery.
        let collections = self
            .relational_store
            .resolve_collections_for(&selected_ids)
            .await
            .map_err(|e| QueryError::Storage(e.to_string()))?;
        if collections.is_empty() {
            return Ok(empty_response("no indexed collections for the resolved datasets", initial_k, top_k));
        }

        // Step 5: per-collection fan-out.
        let search_start = Instant::now();
        let filter = SearchFilter {
            project_id: scope.project_id.map(|id| id.to_string()),
            dataset_ids: selected_ids.iter().map(|id| id.to_string()).collect(),
            repo: req.repo.clone(),
            lang: req.lang.clone(),
            path_prefix: req.path_prefix.clone(),
            source_type: None,
        };
        let params = SearchParams { top_k: initial_k, threshold: req.threshold, filter };
        let fusion = FusionMethod::WeightedSum {
            dense_weight: self.cfg.hybrid_dense_weight,
            sparse_weight: self.cfg.hybrid_sparse_weight,
        };

        let fan_out = collections.iter().map(|name| {
            let vector_store = self.vector_store.clone();
            let dense = dense.clone();
            let sparse = sparse.clone();
            let params = params.clone();
            let name = name.clone();
            async move {
                let outcome = if hybrid_active {
                    vector_store
                        .hybrid_query(&name, &dense, sparse.as_ref().expect("checked above"), &params, fusion)
                        .await
                } else {
                    vector_store.search(&name, &dense, &params).await
                };
                (name, outcome)
            }
        });
        let fanned = futures::future::join_all(fan_out).await;
        let search_ms = search_start.elapsed().as_millis() as u64;

        // Step 6: aggregation, keeping the max score per document id.
        let mut merged: HashMap<String, SearchHit> = HashMap::new();
        let mut any_collection_failed = false;
        for (name, outcome) in fanned {
            match outcome {
                Ok(hits) => {
                    for hit in hits {
                        merged
                            .entry(hit.id.clone())
                            .and_modify(|existing| {
                                if hit.score > existing.score {
                                    *existing = hit.clone();
                                }
                            })
                            .or_insert(hit);
                    }
                }
                Err(error) => {
                    any_collection_failed = true;
                    tracing::warn!(collection = %name, %error, "vector store search failed for collection; skipping");
                }
            }
        }

        let mut candidates: Vec<Candidate> =
            merged.into_values().map(|hit| Candidate { hit, rerank_score: None }).collect();
        candidates.sort_by(|a, b| b.hit.score.partial_cmp(&a.hit.score).unwrap_or(Ordering::Equal));

        // Step 7: optional rerank.
        let mut rerank_ms: Option<u64> = None;
        let mut rerank_used = false;
        if self.cfg.enable_reranking && !candidates.is_empty() {
            let rerank_start = Instant::now();
            let take_n = self.cfg.rerank_candidate_limit.min(candidates.len());
            let mut head: Vec<Candidate> = candidates.drain(0..take_n).collect();
            let tail = candidates;

            let texts: Vec<String> =
                head.iter().map(|c| build_rerank_text(&c.hit, self.cfg.rerank_text_max_chars)).collect();
            let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

            match self.reranker.rerank(&req.query, &text_refs).await {
                Ok(scores) if scores.len() == head.len() => {
                    for (candidate, score) in head.iter_mut().zip(scores) {
                        candidate.rerank_score = Some(score);
                    }
                    head.sort_by(|a, b| {
                        b.rerank_score.unwrap_or(b.hit.score).partial_cmp(&a.rerank_score.unwrap_or(a.hit.score)).unwrap_or(Ordering::Equal)
                    });
                    rerank_used = true;
                }
                Ok(mismatched) => {
                    tracing::warn!(
                        sent = head.len(),
                        received = mismatched.len(),
                        "reranker returned a mismatched score count; degrading to vector ranking"
                    );
                }
                Err(error) => {
                    tracing::warn!(%error, "reranker failed; degrading to vector ranking");
                }
            }

            candidates = head;
            candidates.extend(tail);
            rerank_ms = Some(rerank_start.elapsed().as_millis() as u64);
        }

        // Step 8: trim to final_k.
        candidates.truncate(top_k);

        // Step 9: response assembly.
        let results: Vec<QueryResult> = candidates
            .iter()
            .map(|candidate| {
                let payload = &candidate.hit.payload;
                let final_score = candidate.rerank_score.unwrap_or(candidate.hit.score);
                QueryResult {
                    id: candidate.hit.id.clone(),
                    chunk: payload_str(payload, "content").unwrap_or_default(),
                    file: payload_str(payload, "relative_path").unwrap_or_default(),
                    line_span: LineSpan {
                        start: payload_u32(payload, "start_line").unwrap_or(0),
                        end: payload_u32(payload, "end_line").unwrap_or(0),
                    },
                    scores: ScoreBreakdown {
                        vector: candidate.hit.score,
                        sparse: candidate.hit.sparse_score,
                        rerank: candidate.rerank_score,
                        final_score,
                    },
                    project_id: payload_uuid(payload, "project_id").unwrap_or_default(),
                    dataset_id: payload_uuid(payload, "dataset_id").unwrap_or_default(),
                    repo: payload_str(payload, "repo"),
                    lang: payload_str(payload, "language"),
                    symbol: payload_str(payload, "symbol"),
                }
            })
            .collect();

        let retrieval_method = match (hybrid_active, rerank_used) {
            (true, true) => RetrievalMethod::HybridRerank,
            (true, false) => RetrievalMethod::Hybrid,
            (false, true) => RetrievalMethod::Rerank,
            (false, false) => RetrievalMethod::Dense,
        };

        let mut features_used = vec!["dense".to_string()];
        if hybrid_active {
            features_used.push("hybrid".to_string());
        }
        if rerank_used {
            features_used.push("rerank".to_string());
        }

        let total_ms = total_start.elapsed().as_millis() as u64;
        let mut message = if results.is_empty() {
            "no matching results".to_string()
        } else {
            format!("found {} result(s)", results.len())
        };
        if any_collection_failed {
            message.push_str(" (one or more collections were skipped due to a search failure)");
        }

        Ok(QueryResponse {
            results,
            metadata: ResponseMetadata {
                retrieval_method,
                timing_ms: TimingMs { embedding: embedding_ms, search: search_ms, reranking: rerank_ms, total: total_ms },
                features_used,
                search_params: SearchParamsSummary {
                    initial_k,
                    final_k: top_k,
                    dense_weight: hybrid_active.then_some(self.cfg.hybrid_dense_weight),
                    sparse_weight: hybrid_active.then_some(self.cfg.hybrid_sparse_weight),
                },
            },
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semscope_core::model::IndexedFile;
    use semscope_core::{Collection, Dataset, DatasetStatus};
    use semscope_embeddings::EmbeddingError;
    use semscope_index::IndexError;
    use semscope_storage::StorageError;
    use std::collections::HashMap as Map;

    struct FakeEmbedder;
    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0, 0.0])
        }
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
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
        async fn compute_sparse(&self, _text: &str) -> Result<semscope_core::SparseVector, EmbeddingError> {
            Ok(semscope_core::SparseVector { indices: vec![1], values: vec![0.5] })
        }
        async fn compute_sparse_batch(&self, texts: &[&str]) -> Result<Vec<semscope_core::SparseVector>, EmbeddingError> {
            Ok(texts.iter().map(|_| semscope_core::SparseVector { indices: vec![1], values: vec![0.5] }).collect())
        }
        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    struct FakeVectorStore {
        by_collection: Map<String, Vec<SearchHit>>,
        fail_collections: Vec<String>,
    }
    #[async_trait]
    impl VectorStore for FakeVectorStore {
        async fn has_collection(&self, name: &str) -> Result<bool, IndexError> {
            Ok(self.by_collection.contains_key(name))
        }
        async fn create_collection(&self, _name: &str, _dimension: u64, _hybrid: bool) -> Result<(), IndexError> {
            Ok(())
        }
        async fn drop_collection(&self, _name: &str) -> Result<(), IndexError> {
            Ok(())
        }
        async fn insert(&self, _name: &str, _docs: &[semscope_index::VectorDocument]) -> Result<(), IndexError> {
            Ok(())
        }
        async fn insert_hybrid(&self, _name: &str, _docs: &[semscope_index::VectorDocument]) -> Result<(), IndexError> {
            Ok(())
        }
        async fn search(&self, name: &str, _dense: &[f32], params: &SearchParams) -> Result<Vec<SearchHit>, IndexError> {
            if self.fail_collections.contains(&name.to_string()) {
                return Err(IndexError::Transient("boom".into()));
            }
            let mut hits = self.by_collection.get(name).cloned().unwrap_or_default();
            hits.truncate(params.top_k);
            Ok(hits)
        }
        async fn hybrid_query(
            &self,
            name: &str,
            _dense: &[f32],
            _sparse: &semscope_core::SparseVector,
            params: &SearchParams,
            _fusion: FusionMethod,
        ) -> Result<Vec<SearchHit>, IndexError> {
            self.search(name, _dense, params).await
        }
        async fn delete_by_dataset(&self, _name: &str, _dataset_id: &str) -> Result<u64, IndexError> {
            Ok(0)
        }
        async fn delete_by_path(&self, _name: &str, _dataset_id: &str, _relative_path: &str) -> Result<u64, IndexError> {
            Ok(0)
        }
        async fn list_collections(&self) -> Result<Vec<String>, IndexError> {
            Ok(self.by_collection.keys().cloned().collect())
        }
    }

    struct FakeStorage {
        collections_by_dataset: Map<Uuid, String>,
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
        async fn resolve_collections_for(&self, dataset_ids: &[Uuid]) -> Result<Vec<String>, StorageError> {
            Ok(dataset_ids.iter().filter_map(|id| self.collections_by_dataset.get(id).cloned()).collect())
        }
        async fn get_collection_by_dataset(&self, _dataset_id: Uuid) -> Result<Option<Collection>, StorageError> {
            Ok(None)
        }
        async fn insert_indexed_files(&self, _rows: &[IndexedFile]) -> Result<(), StorageError> {
            Ok(())
        }
        async fn delete_indexed_file(&self, _project_id: Uuid, _dataset_id: Uuid, _relative_path: &str) -> Result<(), StorageError> {
            Ok(())
        }
        async fn get_indexed_files(&self, _project_id: Uuid, _dataset_id: Uuid) -> Result<Vec<IndexedFile>, StorageError> {
            Ok(Vec::new())
        }
        async fn count_indexed_files(&self, _project_id: Uuid, _dataset_id: Uuid) -> Result<i64, StorageError> {
            Ok(0)
        }
        async fn clear_dataset(&self, _dataset_id: Uuid) -> Result<(), StorageError> {
            Ok(())
        }
    }

    struct FakeReranker {
        fail: bool,
    }
    #[async_trait]
    impl Reranker for FakeReranker {
        async fn rerank(&self, _query: &str, candidates: &[&str]) -> Result<Vec<f32>, QueryError> {
            if self.fail {
                return Err(QueryError::Validation("rerank unavailable".into()));
            }
            // Reverse the vector-score order so tests can tell rerank ran.
            Ok((0..candidates.len()).rev().map(|i| i as f32).collect())
        }
    }

    fn hit(id: &str, score: f32, path: &str) -> SearchHit {
        let mut payload = Map::new();
        payload.insert("relative_path".to_string(), serde_json::json!(path));
        payload.insert("content".to_string(), serde_json::json!("fn body() {}"));
        payload.insert("start_line".to_string(), serde_json::json!(1));
        payload.insert("end_line".to_string(), serde_json::json!(10));
        SearchHit { id: id.to_string(), score, sparse_score: None, payload }
    }

    fn dataset(id: Uuid, project_id: Option<Uuid>, name: &str) -> Dataset {
        Dataset { id, project_id, name: name.to_string(), status: DatasetStatus::Active }
    }

    fn engine(
        vector_store: FakeVectorStore,
        storage: FakeStorage,
        sparse_enabled: bool,
        reranking: bool,
        rerank_fail: bool,
    ) -> HybridQueryEngine<FakeEmbedder, FakeSparse, FakeVectorStore, FakeStorage, FakeReranker> {
        let mut cfg = QueryConfig::default();
        cfg.enable_hybrid_search = sparse_enabled;
        cfg.enable_reranking = reranking;
        cfg.rerank_candidate_limit = 20;
        HybridQueryEngine::new(
            Arc::new(FakeEmbedder),
            Arc::new(FakeSparse { enabled: sparse_enabled }),
            Arc::new(vector_store),
            Arc::new(storage),
            Arc::new(FakeReranker { fail: rerank_fail }),
            cfg,
        )
    }

    #[tokio::test]
    async fn dense_only_search_returns_ranked_results() {
        let project = Uuid::new_v4();
        let dataset_id = Uuid::new_v4();
        let mut by_collection = Map::new();
        by_collection.insert("project_p_dataset_main".to_string(), vec![hit("a", 0.9, "a.rs"), hit("b", 0.5, "b.rs")]);
        let mut collections_by_dataset = Map::new();
        collections_by_dataset.insert(dataset_id, "project_p_dataset_main".to_string());

        let engine = engine(
            FakeVectorStore { by_collection, fail_collections: vec![] },
            FakeStorage { collections_by_dataset },
            false,
            false,
            false,
        );

        let req = QueryRequest {
            project: "p".to_string(),
            dataset_selector: None,
            query: "find body".to_string(),
            top_k: Some(5),
            threshold: None,
            repo: None,
            lang: None,
            path_prefix: None,
            include_global: false,
        };
        let scope = QueryScope {
            project_id: Some(project),
            datasets: vec![dataset(dataset_id, Some(project), "main")],
            shares: vec![],
        };

        let response = engine.search(req, scope).await.unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].id, "a");
        assert_eq!(response.metadata.retrieval_method, RetrievalMethod::Dense);
    }

    #[tokio::test]
    async fn empty_dataset_selector_match_returns_empty_with_diagnostics() {
        let project = Uuid::new_v4();
        let dataset_id = Uuid::new_v4();
        let engine = engine(
            FakeVectorStore { by_collection: Map::new(), fail_collections: vec![] },
            FakeStorage { collections_by_dataset: Map::new() },
            false,
            false,
            false,
        );

        let req = QueryRequest {
            project: "p".to_string(),
            dataset_selector: Some(semscope_core::pattern::DatasetSelector::Single("nonexistent-*".to_string())),
            query: "anything".to_string(),
            top_k: None,
            threshold: None,
            repo: None,
            lang: None,
            path_prefix: None,
            include_global: false,
        };
        let scope = QueryScope { project_id: Some(project), datasets: vec![dataset(dataset_id, Some(project), "main")], shares: vec![] };

        let response = engine.search(req, scope).await.unwrap();
        assert!(response.results.is_empty());
        assert!(!response.message.is_empty());
    }

    #[tokio::test]
    async fn all_projects_sentinel_unions_global_and_owned_datasets() {
        let project = Uuid::new_v4();
        let owned_id = Uuid::new_v4();
        let global_id = Uuid::new_v4();
        let mut by_collection = Map::new();
        by_collection.insert("owned".to_string(), vec![hit("x", 0.7, "x.rs")]);
        by_collection.insert("global".to_string(), vec![hit("y", 0.6, "y.rs")]);
        let mut collections_by_dataset = Map::new();
        collections_by_dataset.insert(owned_id, "owned".to_string());
        collections_by_dataset.insert(global_id, "global".to_string());

        let engine = engine(
            FakeVectorStore { by_collection, fail_collections: vec![] },
            FakeStorage { collections_by_dataset },
            false,
            false,
            false,
        );

        let req = QueryRequest {
            project: "ALL".to_string(),
            dataset_selector: None,
            query: "search everything".to_string(),
            top_k: Some(10),
            threshold: None,
            repo: None,
            lang: None,
            path_prefix: None,
            include_global: true,
        };
        let scope = QueryScope {
            project_id: Some(project),
            datasets: vec![dataset(owned_id, Some(project), "owned"), dataset(global_id, None, "global")],
            shares: vec![],
        };

        let response = engine.search(req, scope).await.unwrap();
        let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"x"));
        assert!(ids.contains(&"y"));
    }

    #[tokio::test]
    async fn failing_collection_is_skipped_without_failing_the_request() {
        let project = Uuid::new_v4();
        let good_id = Uuid::new_v4();
        let bad_id = Uuid::new_v4();
        let mut by_collection = Map::new();
        by_collection.insert("good".to_string(), vec![hit("g", 0.8, "g.rs")]);
        let mut collections_by_dataset = Map::new();
        collections_by_dataset.insert(good_id, "good".to_string());
        collections_by_dataset.insert(bad_id, "bad".to_string());

        let engine = engine(
            FakeVectorStore { by_collection, fail_collections: vec!["bad".to_string()] },
            FakeStorage { collections_by_dataset },
            false,
            false,
            false,
        );

        let req = QueryRequest {
            project: "p".to_string(),
            dataset_selector: None,
            query: "q".to_string(),
            top_k: Some(5),
            threshold: None,
            repo: None,
            lang: None,
            path_prefix: None,
            include_global: false,
        };
        let scope = QueryScope {
            project_id: Some(project),
            datasets: vec![dataset(good_id, Some(project), "good"), dataset(bad_id, Some(project), "bad")],
            shares: vec![],
        };

        let response = engine.search(req, scope).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert!(response.message.contains("skipped"));
    }

    #[tokio::test]
    async fn rerank_failure_degrades_to_vector_ranking() {
        let project = Uuid::new_v4();
        let dataset_id = Uuid::new_v4();
        let mut by_collection = Map::new();
        by_collection.insert("c".to_string(), vec![hit("a", 0.9, "a.rs"), hit("b", 0.5, "b.rs")]);
        let mut collections_by_dataset = Map::new();
        collections_by_dataset.insert(dataset_id, "c".to_string());

        let engine = engine(
            FakeVectorStore { by_collection, fail_collections: vec![] },
            FakeStorage { collections_by_dataset },
            false,
            true,
            true,
        );

        let req = QueryRequest {
            project: "p".to_string(),
            dataset_selector: None,
            query: "q".to_string(),
            top_k: Some(5),
            threshold: None,
            repo: None,
            lang: None,
            path_prefix: None,
            include_global: false,
        };
        let scope = QueryScope { project_id: Some(project), datasets: vec![dataset(dataset_id, Some(project), "main")], shares: vec![] };

        let response = engine.search(req, scope).await.unwrap();
        assert_eq!(response.metadata.retrieval_method, RetrievalMethod::Dense);
        assert_eq!(response.results[0].id, "a");
    }

    #[tokio::test]
    async fn successful_rerank_reorders_and_reports_rerank_method() {
        let project = Uuid::new_v4();
        let dataset_id = Uuid::new_v4();
        let mut by_collection = Map::new();
        by_collection.insert("c".to_string(), vec![hit("a", 0.9, "a.rs"), hit("b", 0.5, "b.rs")]);
        let mut collections_by_dataset = Map::new();
        collections_by_dataset.insert(dataset_id, "c".to_string());

        let engine = engine(
            FakeVectorStore { by_collection, fail_collections: vec![] },
            FakeStorage { collections_by_dataset },
            false,
            true,
            false,
        );

        let req = QueryRequest {
            project: "p".to_string(),
            dataset_selector: None,
            query: "q".to_string(),
            top_k: Some(5),
            threshold: None,
            repo: None,
            lang: None,
            path_prefix: None,
            include_global: false,
        };
        let scope = QueryScope { project_id: Some(project), datasets: vec![dataset(dataset_id, Some(project), "main")], shares: vec![] };

        let response = engine.search(req, scope).await.unwrap();
        assert_eq!(response.metadata.retrieval_method, RetrievalMethod::Rerank);
        // FakeReranker reverses order relative to vector score.
        assert_eq!(response.results[0].id, "b");
        assert!(response.metadata.timing_ms.reranking.is_some());
    }
}
