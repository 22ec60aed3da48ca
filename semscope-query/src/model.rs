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

//! Request/response shapes for the Hybrid Query Engine (§4.9) and
//! Index-Status Service (§4.10).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use semscope_core::pattern::DatasetSelector;

/// `{project, dataset_selector?, query, top_k?, threshold?, repo?, lang?,
/// path_prefix?, include_global?}` (§4.9 input).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub project: String,
    #[serde(default)]
    pub dataset_selector: Option<DatasetSelector>,
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f32>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub include_global: bool,
}

/// The scope-snapshot inputs the engine needs to run C1/C2 itself
/// rather than reach into the relational store (§4.1 is a pure function
/// over in-memory dataset/share snapshots; the caller is responsible for
/// fetching that snapshot, e.g. from `RelationalStore`).
#[derive(Debug, Clone)]
pub struct QueryScope {
    /// `None` when `project` resolves to the all-projects sentinel.
    pub project_id: Option<Uuid>,
    pub datasets: Vec<semscope_core::Dataset>,
    pub shares: Vec<semscope_core::ProjectShare>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    Dense,
    Hybrid,
    Rerank,
    #[serde(rename = "hybrid+rerank")]
    HybridRerank,
}

/// `vector` is the score the Vector Store Gateway returned for this
/// document: dense-only when hybrid search was disabled, the blended
/// dense+sparse score when it was enabled (the gateway fuses both in
/// one `hybrid_query` round trip rather than returning them apart).
/// `sparse` is the gateway's distinguishable sparse component when one
/// was computed. `final` is the rerank score when a rerank ran,
/// otherwise it equals `vector`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub vector: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank: Option<f32>,
    #[serde(rename = "final")]
    pub final_score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

/// One ranked result (§4.9 step 9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub id: String,
    pub chunk: String,
    pub file: String,
    pub line_span: LineSpan,
    pub scores: ScoreBreakdown,
    pub project_id: Uuid,
    pub dataset_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingMs {
    pub embedding: u64,
    pub search: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranking: Option<u64>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParamsSummary {
    pub initial_k: usize,
    pub final_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dense_weight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_weight: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub retrieval_method: RetrievalMethod,
    pub timing_ms: TimingMs,
    pub features_used: Vec<String>,
    pub search_params: SearchParamsSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<QueryResult>,
    pub metadata: ResponseMetadata,
    /// Human-readable explanation; always present, even on success (§7).
    pub message: String,
}

/// `(codebase_path, project, dataset)` input to `checkIndex` (§4.10).
#[derive(Debug, Clone)]
pub struct IndexStatusRequest {
    pub codebase_path: std::path::PathBuf,
    pub project_id: Uuid,
    pub dataset_id: Uuid,
    pub with_details: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexRecommendation {
    Skip,
    Incremental,
    FullReindex,
}

impl From<semscope_changedet::IndexRecommendation> for IndexRecommendation {
    fn from(value: semscope_changedet::IndexRecommendation) -> Self {
        match value {
            semscope_changedet::IndexRecommendation::Skip => IndexRecommendation::Skip,
            semscope_changedet::IndexRecommendation::Incremental => IndexRecommendation::Incremental,
            semscope_changedet::IndexRecommendation::FullReindex => IndexRecommendation::FullReindex,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStatusStats {
    pub total_files: usize,
    pub indexed_files: usize,
    pub unchanged_files: usize,
    pub new_files: usize,
    pub modified_files: usize,
    pub deleted_files: usize,
    pub percent_indexed: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStatusDetails {
    pub new: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

/// `{is_indexed, is_fully_indexed, needs_reindex, stats, recommendation,
/// message, details?}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatusResponse {
    pub is_indexed: bool,
    pub is_fully_indexed: bool,
    pub needs_reindex: bool,
    pub stats: IndexStatusStats,
    pub recommendation: IndexRecommendation,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<IndexStatusDetails>,
}
