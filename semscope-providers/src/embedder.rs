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

//! Default `Embedder`/`SparseEncoder` implementations for `semscope-cli`
//! and `semscope-server`. Neither C5 nor the Hybrid Query Engine (C9)
//! care which provider backs these traits (§6); this module supplies an
//! OpenAI-compatible HTTP one so the binaries are runnable out of the
//! box, without the core crates ever depending on `reqwest`.

use async_trait::async_trait;
use semscope_core::SparseVector;
use semscope_embeddings::{EmbeddingError, Embedder, SparseEncoder};

/// Calls an OpenAI-compatible `/embeddings` endpoint. Works unmodified
/// against OpenAI itself or any self-hosted server that mirrors its
/// request/response shape (vLLM, Ollama's OpenAI-compat mode, etc).
pub struct HttpEmbedder {
    api_key: String,
    model: String,
    base_url: String,
    dimension: usize,
    client: reqwest::Client,
}

impl HttpEmbedder {
    pub fn new(api_key: String, model: String, base_url: String, dimension: usize) -> Self {
        Self { api_key, model, base_url, dimension, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vectors = self.embed_batch(&[text]).await?;
        vectors.into_iter().next().ok_or_else(|| EmbeddingError::Provider("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Provider(format!("embedding provider returned {status}: {body}")));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| EmbeddingError::Provider(e.to_string()))?;
        let data = body["data"].as_array().ok_or_else(|| EmbeddingError::Provider("missing data array".to_string()))?;

        let vectors: Vec<Vec<f32>> = data
            .iter()
            .filter_map(|item| item["embedding"].as_array())
            .map(|values| values.iter().filter_map(|v| v.as_f64()).map(|v| v as f32).collect())
            .collect();

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::BatchLengthMismatch { sent: texts.len(), received: vectors.len() });
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Sparse encoding has no default external provider; this keeps the
/// hybrid search path off until a caller wires a real one in.
pub struct DisabledSparseEncoder;

#[async_trait]
impl SparseEncoder for DisabledSparseEncoder {
    async fn compute_sparse(&self, _text: &str) -> Result<SparseVector, EmbeddingError> {
        Ok(SparseVector { indices: Vec::new(), values: Vec::new() })
    }

    async fn compute_sparse_batch(&self, texts: &[&str]) -> Result<Vec<SparseVector>, EmbeddingError> {
        Ok(texts.iter().map(|_| SparseVector { indices: Vec::new(), values: Vec::new() }).collect())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
