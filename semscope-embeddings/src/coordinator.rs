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

//! Embedding Coordinator (C5, §4.5): batches chunk content into bounded
//! dense/sparse calls, runs the two paths concurrently, isolates sparse
//! failures from the dense path, and enforces the hard per-job chunk cap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use semscope_chunker::ChunkDraft;
use semscope_core::config::EmbeddingConfig;
use semscope_core::SparseVector;
use tokio::sync::Semaphore;

use crate::error::EmbeddingError;
use crate::traits::{Embedder, SparseEncoder};

/// Dense vectors plus (optionally) aligned sparse vectors for one batch.
#[derive(Debug, Clone)]
pub struct EmbeddedBatch {
    pub dense: Vec<Vec<f32>>,
    pub sparse: Option<Vec<SparseVector>>,
}

/// Outcome of embedding an entire ingestion job's worth of chunks.
#[derive(Debug, Clone)]
pub enum EmbedJobOutcome {
    Completed {
        dense: Vec<Vec<f32>>,
        sparse: Option<Vec<SparseVector>>,
    },
    /// The job hit `EmbeddingConfig::max_chunks_per_job` (§4.5). This is
    /// not a failure: callers finalize with whatever was embedded and
    /// report `limit_reached` status rather than `failed`.
    LimitReached {
        dense: Vec<Vec<f32>>,
        sparse: Option<Vec<SparseVector>>,
        embedded_count: usize,
    },
}

/// Coordinates dense + sparse embedding of chunk batches under a bounded
/// concurrency semaphore (`EmbeddingConfig::max_concurrent_batches`).
/// New batches block on the semaphore until an in-flight batch
/// completes, which is the coordinator's backpressure mechanism (§5).
pub struct EmbeddingCoordinator<E, S> {
    embedder: Arc<E>,
    sparse_encoder: Arc<S>,
    semaphore: Arc<Semaphore>,
    cfg: EmbeddingConfig,
    in_flight: AtomicUsize,
}

impl<E, S> EmbeddingCoordinator<E, S>
where
    E: Embedder,
    S: SparseEncoder,
{
    pub fn new(embedder: Arc<E>, sparse_encoder: Arc<S>, cfg: EmbeddingConfig) -> Self {
        let permits = cfg.max_concurrent_batches.max(1);
        Self {
            embedder,
            sparse_encoder,
            semaphore: Arc::new(Semaphore::new(permits)),
            cfg,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Number of batches currently holding a semaphore permit. Exposed
    /// for the concurrency-bound property test (§8 property 6).
    pub fn in_flight_batches(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Embeds one batch of chunk content. Dense failures are fatal to
    /// the batch; sparse failures degrade to `sparse: None` with a
    /// warning rather than failing the whole batch (§4.5).
    pub async fn embed_batch(&self, texts: &[&str], want_sparse: bool) -> Result<EmbeddedBatch, EmbeddingError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| EmbeddingError::Cancelled)?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let dense_fut = self.embedder.embed_batch(texts);
        let sparse_fut = async {
            if want_sparse && self.sparse_encoder.is_enabled() {
                Some(self.sparse_encoder.compute_sparse_batch(texts).await)
            } else {
                None
            }
        };

        let (dense_result, sparse_result) = tokio::join!(dense_fut, sparse_fut);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        drop(permit);

        let dense = dense_result?;
        if dense.len() != texts.len() {
            return Err(EmbeddingError::BatchLengthMismatch {
                sent: texts.len(),
                received: dense.len(),
            });
        }

        let sparse = match sparse_result {
            Some(Ok(vectors)) if vectors.len() == texts.len() => Some(vectors),
            Some(Ok(vectors)) => {
                tracing::warn!(
                    sent = texts.len(),
                    received = vectors.len(),
                    "sparse batch length mismatch; degrading to dense-only"
                );
                None
            }
            Some(Err(error)) => {
                tracing::warn!(%error, "sparse encoding failed; degrading to dense-only");
                None
            }
            None => None,
        };

        Ok(EmbeddedBatch { dense, sparse })
    }

    /// Embeds `chunks` in `EmbeddingConfig::batch_size`-sized batches,
    /// stopping before the job's total embedded count would exceed
    /// `max_chunks_per_job`. `already_embedded` lets callers resume an
    /// in-progress job (e.g. across ingestion retries) without re-cap
    /// miscounting.
    pub async fn embed_job(
        &self,
        chunks: &[ChunkDraft],
        want_sparse: bool,
        already_embedded: usize,
    ) -> Result<EmbedJobOutcome, EmbeddingError> {
        let mut dense_out = Vec::with_capacity(chunks.len());
        let mut sparse_out: Option<Vec<SparseVector>> = if want_sparse { Some(Vec::new()) } else { None };
        let mut sparse_degraded = false;
        let mut embedded_total = already_embedded;

        for batch in chunks.chunks(self.cfg.batch_size.max(1)) {
            if embedded_total + batch.len() > self.cfg.max_chunks_per_job {
                return Ok(EmbedJobOutcome::LimitReached {
                    dense: dense_out,
                    sparse: sparse_out,
                    embedded_count: embedded_total,
                });
            }

            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            let embedded = self.embed_batch(&texts, want_sparse).await?;
            dense_out.extend(embedded.dense);

            match (&mut sparse_out, embedded.sparse, sparse_degraded) {
                (Some(accum), Some(batch_sparse), false) => accum.extend(batch_sparse),
                (Some(_), _, _) if !sparse_degraded => {
                    // This batch's sparse path failed while earlier batches
                    // succeeded: the per-job sparse vector would no longer
                    // align index-for-index with dense, so drop it entirely.
                    sparse_degraded = true;
                    sparse_out = None;
                }
                _ => {}
            }

            embedded_total += batch.len();
        }

        Ok(EmbedJobOutcome::Completed {
            dense: dense_out,
            sparse: sparse_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;
    use std::time::Duration;

    struct FakeEmbedder {
        dim: usize,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![0.0; self.dim])
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(texts.iter().map(|_| vec![0.0; self.dim]).collect())
        }

        fn dimension(&self) -> usize {
            self.dim
        }
    }

    struct FakeSparse {
        enabled: bool,
        fail: bool,
    }

    #[async_trait]
    impl SparseEncoder for FakeSparse {
        async fn compute_sparse(&self, _text: &str) -> Result<SparseVector, EmbeddingError> {
            Ok(SparseVector { indices: vec![0], values: vec![1.0] })
        }

        async fn compute_sparse_batch(&self, texts: &[&str]) -> Result<Vec<SparseVector>, EmbeddingError> {
            if self.fail {
                return Err(EmbeddingError::Provider("boom".into()));
            }
            Ok(texts
                .iter()
                .map(|_| SparseVector { indices: vec![0], values: vec![1.0] })
                .collect())
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    fn cfg(batch_size: usize, max_concurrent: usize, max_per_job: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            batch_size,
            chunk_batch_size: 16,
            max_concurrent_batches: max_concurrent,
            max_chunks_per_job: max_per_job,
        }
    }

    fn draft(i: usize) -> ChunkDraft {
        ChunkDraft {
            relative_path: "f.rs".into(),
            start_line: i as u32,
            end_line: i as u32,
            chunk_index: i as u32,
            content: format!("chunk {i}"),
            language: None,
            symbol: None,
        }
    }

    #[tokio::test]
    async fn sparse_failure_degrades_without_failing_dense() {
        let coordinator = EmbeddingCoordinator::new(
            Arc::new(FakeEmbedder { dim: 4 }),
            Arc::new(FakeSparse { enabled: true, fail: true }),
            cfg(10, 1, 1000),
        );
        let result = coordinator.embed_batch(&["a", "b"], true).await.unwrap();
        assert_eq!(result.dense.len(), 2);
        assert!(result.sparse.is_none());
    }

    #[tokio::test]
    async fn disabled_sparse_encoder_skips_sparse_path() {
        let coordinator = EmbeddingCoordinator::new(
            Arc::new(FakeEmbedder { dim: 4 }),
            Arc::new(FakeSparse { enabled: false, fail: false }),
            cfg(10, 1, 1000),
        );
        let result = coordinator.embed_batch(&["a"], true).await.unwrap();
        assert!(result.sparse.is_none());
    }

    #[tokio::test]
    async fn job_respects_per_job_cap() {
        let coordinator = EmbeddingCoordinator::new(
            Arc::new(FakeEmbedder { dim: 4 }),
            Arc::new(FakeSparse { enabled: false, fail: false }),
            cfg(5, 2, 12),
        );
        let chunks: Vec<ChunkDraft> = (0..20).map(draft).collect();
        let outcome = coordinator.embed_job(&chunks, false, 0).await.unwrap();
        match outcome {
            EmbedJobOutcome::LimitReached { dense, embedded_count, .. } => {
                assert_eq!(embedded_count, 10);
                assert_eq!(dense.len(), 10);
            }
            EmbedJobOutcome::Completed { .. } => panic!("expected limit to be reached"),
        }
    }

    #[tokio::test]
    async fn job_completes_when_under_cap() {
        let coordinator = EmbeddingCoordinator::new(
            Arc::new(FakeEmbedder { dim: 4 }),
            Arc::new(FakeSparse { enabled: true, fail: false }),
            cfg(4, 2, 1000),
        );
        let chunks: Vec<ChunkDraft> = (0..9).map(draft).collect();
        let outcome = coordinator.embed_job(&chunks, true, 0).await.unwrap();
        match outcome {
            EmbedJobOutcome::Completed { dense, sparse } => {
                assert_eq!(dense.len(), 9);
                assert_eq!(sparse.unwrap().len(), 9);
            }
            EmbedJobOutcome::LimitReached { .. } => panic!("did not expect cap to trigger"),
        }
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_configured_bound() {
        let coordinator = Arc::new(EmbeddingCoordinator::new(
            Arc::new(FakeEmbedder { dim: 4 }),
            Arc::new(FakeSparse { enabled: false, fail: false }),
            cfg(2, 2, 1000),
        ));
        let max_observed = Arc::new(StdAtomicUsize::new(0));

        let poller = {
            let coordinator = coordinator.clone();
            let max_observed = max_observed.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    max_observed.fetch_max(coordinator.in_flight_batches(), Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_micros(200)).await;
                }
            })
        };

        let mut handles = Vec::new();
        for _ in 0..6 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move { coordinator.embed_batch(&["a", "b"], false).await.unwrap() }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        poller.await.unwrap();
        assert!(max_observed.load(Ordering::SeqCst) <= 2);
        assert!(max_observed.load(Ordering::SeqCst) >= 1);
    }
}
