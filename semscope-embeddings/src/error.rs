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

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("dense embedding provider failed: {0}")]
    Provider(String),

    #[error("embedding batch length mismatch: sent {sent} texts, received {received} vectors")]
    BatchLengthMismatch { sent: usize, received: usize },

    #[error("embedding job cancelled")]
    Cancelled,
}

impl EmbeddingError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            EmbeddingError::Provider(_) => ErrorKind::Transient,
            EmbeddingError::BatchLengthMismatch { .. } => ErrorKind::Permanent,
            EmbeddingError::Cancelled => ErrorKind::Cancelled,
        }
    }
}
