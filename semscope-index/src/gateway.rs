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

//! Vector Store Gateway (C6, §4.6): a qdrant-backed implementation of the
//! `VectorStore` trait. Dense vectors live under the named vector
//! `"dense"`; sparse vectors, when a collection is created `hybrid`,
//! live under the named sparse vector `"sparse"`.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, FieldCondition, Filter,
    Match, NamedVectors, PointStruct, PrefetchQueryBuilder, Query, QueryPointsBuilder, ScrollPointsBuilder,
    SearchPointsBuilder, SparseIndexConfigBuilder, SparseVectorParamsBuilder, SparseVectorsConfigBuilder,
    UpsertPointsBuilder, Value as QdrantValue, Vector, VectorParamsBuilder, VectorsConfigBuilder,
};
use qdrant_client::Qdrant;
use uuid::Uuid;

use semscope_core::SparseVector;

use crate::error::IndexError;
use crate::fusion::{fuse, FusionMethod};
use crate::model::{SearchFilter, SearchHit, SearchParams, VectorDocument};

const DENSE_VECTOR_NAME: &str = "dense";
const SPARSE_VECTOR_NAME: &str = "sparse";

/// Namespace for deriving qdrant point ids from `chunk_id()` strings.
/// Qdrant's `PointId` only accepts a u64 or a canonical UUID — a
/// `"chunk_" + hex` string is neither, and the client's `From<String>`
/// impl stuffs it into the UUID variant unvalidated, so it would be
/// silently rejected by a real server. `chunk_id()` stays in the
/// payload (under `"id"`) for human-readable lookups.
const POINT_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3d, 0x1e, 0x5f, 0x2a, 0x9c, 0x4b, 0x4a, 0x7e, 0x8f, 0x21, 0x6a, 0x5d, 0x0e, 0x3c, 0x9b, 0x77,
]);

fn point_id_for_chunk(chunk_id: &str) -> Uuid {
    Uuid::new_v5(&POINT_ID_NAMESPACE, chunk_id.as_bytes())
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn has_collection(&self, name: &str) -> Result<bool, IndexError>;
    async fn create_collection(&self, name: &str, dimension: u64, hybrid: bool) -> Result<(), IndexError>;
    async fn drop_collection(&self, name: &str) -> Result<(), IndexError>;
    async fn insert(&self, name: &str, docs: &[VectorDocument]) -> Result<(), IndexError>;
    async fn insert_hybrid(&self, name: &str, docs: &[VectorDocument]) -> Result<(), IndexError>;
    async fn search(&self, name: &str, dense: &[f32], params: &SearchParams) -> Result<Vec<SearchHit>, IndexError>;
    async fn hybrid_query(
        &self,
        name: &str,
        dense: &[f32],
        sparse: &SparseVector,
        params: &SearchParams,
        fusion: FusionMethod,
    ) -> Result<Vec<SearchHit>, IndexError>;
    async fn delete_by_dataset(&self, name: &str, dataset_id: &str) -> Result<u64, IndexError>;
    /// Deletes a single file's chunks by `{dataset_id, relative_path}` (§4.8
    /// incremental reindex: deleted/modified files are removed by payload
    /// filter before their replacement chunks, if any, are upserted).
    async fn delete_by_path(&self, name: &str, dataset_id: &str, relative_path: &str) -> Result<u64, IndexError>;
    async fn list_collections(&self) -> Result<Vec<String>, IndexError>;
}

pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    pub fn new(client: Qdrant) -> Self {
        Self { client }
    }

    pub fn connect(url: &str) -> Result<Self, IndexError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| IndexError::Permanent(format!("failed to build qdrant client: {e}")))?;
        Ok(Self { client })
    }
}

fn build_filter(filter: &SearchFilter) -> Option<Filter> {
    let mut must = Vec::new();

    if let Some(project_id) = &filter.project_id {
        must.push(Condition::matches("project_id", project_id.clone()));
    }
    if !filter.dataset_ids.is_empty() {
        must.push(Condition::matches("dataset_id", filter.dataset_ids.clone()));
    }
    if let Some(repo) = &filter.repo {
        must.push(Condition::matches("repo", repo.clone()));
    }
    if let Some(lang) = &filter.lang {
        must.push(Condition::matches("language", lang.clone()));
    }
    if let Some(source_type) = &filter.source_type {
        must.push(Condition::matches("source_type", source_type.clone()));
    }
    if let Some(prefix) = &filter.path_prefix {
        must.push(Condition::field(FieldCondition {
            key: "relative_path".to_string(),
            r#match: Some(Match::text(prefix.clone())),
            ..Default::default()
        }));
    }

    if must.is_empty() {
        None
    } else {
        Some(Filter::must(must))
    }
}

fn payload_to_map(payload: HashMap<String, QdrantValue>) -> HashMap<String, serde_json::Value> {
    payload
        .into_iter()
        .map(|(k, v)| (k, qdrant_value_to_json(v)))
        .collect()
}

fn qdrant_value_to_json(value: QdrantValue) -> serde_json::Value {
    serde_json::to_value(value.kind).unwrap_or(serde_json::Value::Null)
}

fn point_from_document(doc: &VectorDocument, hybrid: bool) -> PointStruct {
    let mut vectors = NamedVectors::default().add_vector(DENSE_VECTOR_NAME, doc.dense.clone());
    if hybrid {
        if let Some(sparse) = &doc.sparse {
            let sparse_vector = Vector::new_sparse(sparse.indices.clone(), sparse.values.clone());
            vectors = vectors.add_vector_named(SPARSE_VECTOR_NAME, sparse_vector);
        }
    }
    let payload: qdrant_client::Payload = doc
        .payload
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<serde_json::Map<_, _>>()
        .into();
    PointStruct::new(point_id_for_chunk(&doc.id).to_string(), vectors, payload)
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn has_collection(&self, name: &str) -> Result<bool, IndexError> {
        self.client.collection_exists(name).await.map_err(IndexError::from_qdrant)
    }

    async fn create_collection(&self, name: &str, dimension: u64, hybrid: bool) -> Result<(), IndexError> {
        let mut vectors_config = VectorsConfigBuilder::default();
        vectors_config.add_named_vector_params(DENSE_VECTOR_NAME, VectorParamsBuilder::new(dimension, Distance::Cosine));

        let mut request = CreateCollectionBuilder::new(name).vectors_config(vectors_config);

        if hybrid {
            let mut sparse_config = SparseVectorsConfigBuilder::default();
            sparse_config.add_named_vector_params(
                SPARSE_VECTOR_NAME,
                SparseVectorParamsBuilder::default().index(SparseIndexConfigBuilder::default()),
            );
            request = request.sparse_vectors_config(sparse_config);
        }

        self.client
            .create_collection(request)
            .await
            .map(|_| ())
            .map_err(IndexError::from_qdrant)
    }

    async fn drop_collection(&self, name: &str) -> Result<(), IndexError> {
        self.client
            .delete_collection(name)
            .await
            .map(|_| ())
            .map_err(IndexError::from_qdrant)
    }

    async fn insert(&self, name: &str, docs: &[VectorDocument]) -> Result<(), IndexError> {
        let points: Vec<PointStruct> = docs.iter().map(|d| point_from_document(d, false)).collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(name, points))
            .await
            .map(|_| ())
            .map_err(IndexError::from_qdrant)
    }

    async fn insert_hybrid(&self, name: &str, docs: &[VectorDocument]) -> Result<(), IndexError> {
        let points: Vec<PointStruct> = docs.iter().map(|d| point_from_document(d, true)).collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(name, points))
            .await
            .map(|_| ())
            .map_err(IndexError::from_qdrant)
    }

    async fn search(&self, name: &str, dense: &[f32], params: &SearchParams) -> Result<Vec<SearchHit>, IndexError> {
        if !self.has_collection(name).await? {
            return Err(IndexError::NotFound(name.to_string()));
        }

        let mut builder = SearchPointsBuilder::new(name, dense.to_vec(), params.top_k as u64)
            .vector_name(DENSE_VECTOR_NAME)
            .with_payload(true);
        if let Some(threshold) = params.threshold {
            builder = builder.score_threshold(threshold);
        }
        if let Some(filter) = build_filter(&params.filter) {
            builder = builder.filter(filter);
        }

        let response = self.client.search_points(builder).await.map_err(IndexError::from_qdrant)?;
        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let payload = payload_to_map(point.payload);
                SearchHit { id: hit_id(point.id, &payload), score: point.score, sparse_score: None, payload }
            })
            .collect())
    }

    async fn hybrid_query(
        &self,
        name: &str,
        dense: &[f32],
        sparse: &SparseVector,
        params: &SearchParams,
        fusion: FusionMethod,
    ) -> Result<Vec<SearchHit>, IndexError> {
        if !self.has_collection(name).await? {
            return Err(IndexError::NotFound(name.to_string()));
        }

        let filter = build_filter(&params.filter);

        let mut dense_builder = QueryPointsBuilder::new(name)
            .query(Query::new_nearest(dense.to_vec()))
            .using(DENSE_VECTOR_NAME)
            .limit(params.top_k as u64)
            .with_payload(true);
        if let Some(f) = filter.clone() {
            dense_builder = dense_builder.filter(f);
        }

        let dense_response = self
            .client
            .query(dense_builder)
            .await
            .map_err(IndexError::from_qdrant)?;
        let dense_hits: Vec<SearchHit> = dense_response
            .result
            .into_iter()
            .map(|point| {
                let payload = payload_to_map(point.payload);
                SearchHit { id: hit_id(point.id, &payload), score: point.score, sparse_score: None, payload }
            })
            .collect();

        let sparse_hits = if sparse.is_valid() && !sparse.indices.is_empty() {
            let sparse_pairs: Vec<(u32, f32)> = sparse
                .indices
                .iter()
                .zip(sparse.values.iter())
                .map(|(i, v)| (*i, *v))
                .collect();

            let mut sparse_builder = QueryPointsBuilder::new(name)
                .query(sparse_pairs)
                .using(SPARSE_VECTOR_NAME)
                .limit(params.top_k as u64)
                .with_payload(true);
            if let Some(f) = filter {
                sparse_builder = sparse_builder.filter(f);
            }

            let sparse_response = self
                .client
                .query(sparse_builder)
                .await
                .map_err(IndexError::from_qdrant)?;
            sparse_response
                .result
                .into_iter()
                .map(|point| {
                    let payload = payload_to_map(point.payload);
                    SearchHit { id: hit_id(point.id, &payload), score: point.score, sparse_score: None, payload }
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut fused = fuse(&dense_hits, &sparse_hits, fusion);
        if let Some(threshold) = params.threshold {
            fused.retain(|hit| hit.score >= threshold);
        }
        fused.truncate(params.top_k);
        Ok(fused)
    }

    async fn delete_by_dataset(&self, name: &str, dataset_id: &str) -> Result<u64, IndexError> {
        if !self.has_collection(name).await? {
            return Err(IndexError::NotFound(name.to_string()));
        }

        let filter = Filter::must(vec![Condition::matches("dataset_id", dataset_id.to_string())]);

        let mut to_delete = 0u64;
        let mut offset = None;
        loop {
            let mut scroll = ScrollPointsBuilder::new(name).filter(filter.clone()).limit(1000);
            if let Some(cursor) = offset.take() {
                scroll = scroll.offset(cursor);
            }
            let page = self.client.scroll(scroll).await.map_err(IndexError::from_qdrant)?;
            to_delete += page.result.len() as u64;
            offset = page.next_page_offset;
            if offset.is_none() {
                break;
            }
        }

        self.client
            .delete_points(DeletePointsBuilder::new(name).points(filter))
            .await
            .map_err(IndexError::from_qdrant)?;

        Ok(to_delete)
    }

    async fn delete_by_path(&self, name: &str, dataset_id: &str, relative_path: &str) -> Result<u64, IndexError> {
        if !self.has_collection(name).await? {
            return Err(IndexError::NotFound(name.to_string()));
        }

        let filter = Filter::must(vec![
            Condition::matches("dataset_id", dataset_id.to_string()),
            Condition::matches("relative_path", relative_path.to_string()),
        ]);

        let mut to_delete = 0u64;
        let mut offset = None;
        loop {
            let mut scroll = ScrollPointsBuilder::new(name).filter(filter.clone()).limit(1000);
            if let Some(cursor) = offset.take() {
                scroll = scroll.offset(cursor);
            }
            let page = self.client.scroll(scroll).await.map_err(IndexError::from_qdrant)?;
            to_delete += page.result.len() as u64;
            offset = page.next_page_offset;
            if offset.is_none() {
                break;
            }
        }

        self.client
            .delete_points(DeletePointsBuilder::new(name).points(filter))
            .await
            .map_err(IndexError::from_qdrant)?;

        Ok(to_delete)
    }

    async fn list_collections(&self) -> Result<Vec<String>, IndexError> {
        let response = self.client.list_collections().await.map_err(IndexError::from_qdrant)?;
        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }
}

fn point_id_to_string(id: Option<qdrant_client::qdrant::PointId>) -> String {
    match id.and_then(|p| p.point_id_options) {
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u)) => u,
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

/// The point id is a derived UUID (see [`point_id_for_chunk`]), not the
/// human-readable `chunk_id()` string callers expect back in results; the
/// original string travels in the payload under `"id"` and takes
/// precedence, falling back to the point id for points upserted before
/// this payload field existed.
fn hit_id(point_id: Option<qdrant_client::qdrant::PointId>, payload: &HashMap<String, serde_json::Value>) -> String {
    payload
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| point_id_to_string(point_id))
}
