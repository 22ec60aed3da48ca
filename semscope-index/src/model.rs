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

//! Collection-agnostic document and filter shapes for the Vector Store
//! Gateway (§4.6, §3). These map to qdrant points/payload/filters at the
//! gateway boundary; nothing above this crate should see qdrant types.

use serde_json::Value;
use std::collections::HashMap;

/// One chunk's dense (and optional sparse) vectors plus its payload
/// (§3 "Chunk payload"). `id` is the stable digest computed by the
/// caller (`semscope_core::model::chunk_id`); inserting the same `id`
/// twice overwrites rather than duplicates (idempotent upsert).
#[derive(Debug, Clone)]
pub struct VectorDocument {
    pub id: String,
    pub dense: Vec<f32>,
    pub sparse: Option<semscope_core::SparseVector>,
    pub payload: HashMap<String, Value>,
}

/// Filter model (§4.6). `dataset_ids` always evaluates as set membership.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub project_id: Option<String>,
    pub dataset_ids: Vec<String>,
    pub repo: Option<String>,
    pub lang: Option<String>,
    pub path_prefix: Option<String>,
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub top_k: usize,
    pub threshold: Option<f32>,
    pub filter: SearchFilter,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    /// Present when `hybrid_query` returned a distinguishable sparse
    /// component (§4.9 fusion); `None` for plain dense `search`.
    pub sparse_score: Option<f32>,
    pub payload: HashMap<String, Value>,
}
