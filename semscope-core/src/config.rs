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

//! Tunable knobs (§6), layered the way every other ambient setting in
//! this workspace is: built-in defaults, overridden by an optional TOML
//! file, overridden by `SEMSCOPE_*` environment variables.

use serde::{Deserialize, Serialize};

/// Chunker knobs (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    pub char_target: usize,
    pub char_overlap: usize,
    /// Soft per-file warning threshold; ingestion proceeds regardless.
    pub soft_chunk_warning: usize,
    pub soft_size_warning_bytes: u64,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            char_target: 1000,
            char_overlap: 100,
            soft_chunk_warning: 50,
            soft_size_warning_bytes: 100 * 1024,
        }
    }
}

/// Embedding Coordinator knobs (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub batch_size: usize,
    pub chunk_batch_size: usize,
    pub max_concurrent_batches: usize,
    /// Hard per-job chunk cap; exceeding it yields `limit_reached`, not
    /// `failed` (§4.5, §4.8).
    pub max_chunks_per_job: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            chunk_batch_size: 16,
            max_concurrent_batches: 1,
            max_chunks_per_job: 450_000,
        }
    }
}

/// Hybrid Query Engine knobs (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub enable_hybrid_search: bool,
    pub enable_reranking: bool,
    pub hybrid_dense_weight: f32,
    pub hybrid_sparse_weight: f32,
    pub rerank_initial_k: usize,
    pub rerank_candidate_limit: usize,
    pub rerank_text_max_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            enable_hybrid_search: true,
            enable_reranking: true,
            hybrid_dense_weight: 0.6,
            hybrid_sparse_weight: 0.4,
            rerank_initial_k: 150,
            rerank_candidate_limit: 20,
            rerank_text_max_chars: 4000,
        }
    }
}

/// Aggregate settings for the whole workspace, loaded once at process
/// start and passed down by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SemscopeConfig {
    pub chunker: ChunkerConfig,
    pub embedding: EmbeddingConfig,
    pub query: QueryConfig,
}

impl SemscopeConfig {
    /// Layers defaults -> optional TOML file at `path` -> `SEMSCOPE_*`
    /// environment variables (e.g. `SEMSCOPE_EMBEDDING__BATCH_SIZE=50`),
    /// the same three-tier shape the CLI and server both use.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix("SEMSCOPE").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = SemscopeConfig::default();
        assert_eq!(cfg.chunker.char_target, 1000);
        assert_eq!(cfg.chunker.char_overlap, 100);
        assert_eq!(cfg.embedding.batch_size, 100);
        assert_eq!(cfg.embedding.chunk_batch_size, 16);
        assert_eq!(cfg.embedding.max_concurrent_batches, 1);
        assert_eq!(cfg.embedding.max_chunks_per_job, 450_000);
        assert!(cfg.query.enable_hybrid_search);
        assert!(cfg.query.enable_reranking);
        assert_eq!(cfg.query.hybrid_dense_weight, 0.6);
        assert_eq!(cfg.query.hybrid_sparse_weight, 0.4);
        assert_eq!(cfg.query.rerank_initial_k, 150);
        assert_eq!(cfg.query.rerank_candidate_limit, 20);
        assert_eq!(cfg.query.rerank_text_max_chars, 4000);
    }

    #[test]
    fn load_with_missing_file_falls_back_to_defaults() {
        let cfg = SemscopeConfig::load(Some("/nonexistent/semscope.toml")).expect("defaults still load");
        assert_eq!(cfg.chunker.char_target, 1000);
    }
}
