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

/// Errors surfaced by the Hybrid Query Engine (§4.9) and Index-Status
/// Service (§4.10). Per-collection vector-store failures and reranker
/// failures are recovered locally (logged, degraded) rather than
/// represented here — only failures fatal to the whole request reach
/// this type (§7).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    Validation(String),

    #[error("query embedding failed: {0}")]
    Embedding(String),

    #[error("relational store lookup failed: {0}")]
    Storage(String),
}

impl QueryError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            QueryError::Validation(_) => ErrorKind::Validation,
            QueryError::Embedding(_) => ErrorKind::Transient,
            QueryError::Storage(_) => ErrorKind::Transient,
        }
    }
}
