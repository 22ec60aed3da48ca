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

//! Hybrid Query Engine (C9) and Index-Status Service (C10): the read
//! path over everything `semscope-ingest` writes. Resolves scope and
//! dataset selectors, embeds the query, fans a dense+sparse search out
//! across every matching collection, fuses and optionally reranks the
//! results, and reports codebase index freshness.

pub mod cache;
pub mod engine;
pub mod error;
pub mod model;
pub mod reranker;
pub mod status;

pub use cache::QueryEmbeddingCache;
pub use engine::HybridQueryEngine;
pub use error::QueryError;
pub use model::{
    IndexRecommendation, IndexStatusDetails, IndexStatusRequest, IndexStatusResponse, IndexStatusStats,
    LineSpan, QueryRequest, QueryResponse, QueryResult, QueryScope, ResponseMetadata, RetrievalMethod,
    ScoreBreakdown, SearchParamsSummary, TimingMs,
};
pub use reranker::Reranker;
pub use status::check_index;
