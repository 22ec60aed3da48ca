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

/// Errors surfaced by the Vector Store Gateway (§4.6). `NotFound` is the
/// only variant callers are expected to branch on; everything else is
/// `Transient` (retryable) or `Permanent` per the taxonomy in §7.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("collection '{0}' does not exist")]
    NotFound(String),

    #[error("vector store request failed: {0}")]
    Transient(String),

    #[error("vector store rejected request: {0}")]
    Permanent(String),
}

impl IndexError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            IndexError::NotFound(_) => ErrorKind::NotFound,
            IndexError::Transient(_) => ErrorKind::Transient,
            IndexError::Permanent(_) => ErrorKind::Permanent,
        }
    }

    pub(crate) fn from_qdrant(err: qdrant_client::QdrantError) -> Self {
        // qdrant-client does not expose a structured status code in all
        // transport variants; treat anything we can't positively classify
        // as transient so ingest/query retries rather than hard-fails.
        let message = err.to_string();
        if message.contains("not found") || message.contains("doesn't exist") {
            IndexError::NotFound(message)
        } else if message.contains("invalid")
            || message.contains("Wrong input")
            || message.contains("already exists")
        {
            IndexError::Permanent(message)
        } else {
            IndexError::Transient(message)
        }
    }
}
