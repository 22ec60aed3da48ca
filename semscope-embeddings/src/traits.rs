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

//! External-interface contracts for dense and sparse embedding providers
//! (§6). Implementations live outside this crate; the coordinator only
//! needs these shapes to batch and fan them out.

use async_trait::async_trait;
use semscope_core::SparseVector;

use crate::error::EmbeddingError;

/// A dense embedding provider. `dimension` must be stable for the
/// lifetime of a provider instance; the coordinator does not re-detect
/// it between batches.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn dimension(&self) -> usize;
}

/// A sparse (e.g. BM25/SPLADE-style) encoder. Sparse encoding is
/// optional end-to-end: `is_enabled` lets the coordinator skip the
/// sparse path entirely rather than call a no-op provider.
#[async_trait]
pub trait SparseEncoder: Send + Sync {
    async fn compute_sparse(&self, text: &str) -> Result<SparseVector, EmbeddingError>;

    async fn compute_sparse_batch(&self, texts: &[&str]) -> Result<Vec<SparseVector>, EmbeddingError>;

    fn is_enabled(&self) -> bool;
}
