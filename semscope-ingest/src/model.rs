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

//! Request/response shapes for the Ingestion Orchestrator (C8, §4.8).

use semscope_changedet::WalkConfig;
use serde::{Deserialize, Serialize};

/// One non-code document to ingest (§4.8 web-page path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebPage {
    pub relative_path: String,
    pub content: String,
}

/// Where the content for a job comes from. A codebase path is walked
/// with the change detector (C4); a page set is iterated directly —
/// there is no filesystem tree to diff against, so every page is always
/// (re)chunked and (re)embedded.
#[derive(Debug, Clone)]
pub enum IngestSource {
    Codebase(WalkConfig),
    PageSet(Vec<WebPage>),
}

/// Provenance attached to every chunk produced by this job (§3 Chunk
/// payload `repo`/`branch`/`sha`), when the caller has it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Provenance {
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub sha: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub project: String,
    pub dataset: String,
    pub provenance: Provenance,
    /// Drops and rebuilds the collection before ingesting (§4.8 "force
    /// full reindex"), bypassing the change detector entirely.
    pub force: bool,
}

/// Outcome of one ingestion job (§4.8, §4.5 `EmbedJobOutcome`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    /// `EmbeddingConfig::max_chunks_per_job` was hit; the job finalized
    /// with whatever was embedded before the cap (§4.5, §4.8).
    LimitReached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestJobResult {
    pub collection_name: String,
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub files_deleted: usize,
    pub total_chunks: usize,
    pub status: JobStatus,
}

/// Phase markers for [`ProgressEvent`] (§4.8 progress reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPhase {
    Scanning,
    Chunking,
    Embedding,
    Finalizing,
}

/// Emitted at file boundaries over the optional progress channel so a
/// caller (CLI progress bar, server SSE stream) can report job status
/// without polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub phase: IngestPhase,
    pub current: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.current as f64 / self.total as f64) * 100.0
        }
    }
}
