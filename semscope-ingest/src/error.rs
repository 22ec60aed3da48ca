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

use semscope_core::ErrorKind;

/// Errors fatal to an ingestion job. Per-file chunking failures and
/// per-batch embedding/upsert failures are recovered locally (logged,
/// skipped) rather than represented here — only failures that abort the
/// whole job reach this type (§4.8, §7).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid ingest request: {0}")]
    Validation(String),

    #[error("vector store operation failed: {0}")]
    VectorStore(String),

    #[error("relational store operation failed: {0}")]
    Storage(String),

    #[error("ingestion job was cancelled")]
    Cancelled,
}

impl IngestError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            IngestError::Validation(_) => ErrorKind::Validation,
            IngestError::VectorStore(_) => ErrorKind::Transient,
            IngestError::Storage(_) => ErrorKind::Transient,
            IngestError::Cancelled => ErrorKind::Cancelled,
        }
    }
}
