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

//! Default `Reranker` for `semscope-cli`/`semscope-server`.

use async_trait::async_trait;
use semscope_query::{QueryError, Reranker};

/// No reranking model wired in; the engine's `cfg.enable_reranking`
/// gates whether this ever gets called, so this exists purely to
/// satisfy `HybridQueryEngine`'s generic bound when no cross-encoder is
/// configured.
pub struct NoopReranker;

#[async_trait]
impl Reranker for NoopReranker {
    async fn rerank(&self, _query: &str, candidates: &[&str]) -> Result<Vec<f32>, QueryError> {
        Ok(vec![0.0; candidates.len()])
    }
}
