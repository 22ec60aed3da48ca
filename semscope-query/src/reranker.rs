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

//! Cross-encoder reranker external interface (§6). Implementations live
//! outside this crate; the engine only needs a length-matched score list
//! back for a `(query, candidate texts)` pair.

use async_trait::async_trait;

use crate::error::QueryError;

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Scores each of `candidates` against `query`. A successful result
    /// must have exactly `candidates.len()` scores, in the same order;
    /// the engine treats any other length as a failed rerank and
    /// degrades the whole batch to its pre-rerank vector score (§7).
    async fn rerank(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>, QueryError>;
}
