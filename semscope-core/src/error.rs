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

//! Shared error taxonomy (kinds, not names) used across the workspace.
//!
//! Each crate that talks to an external system (embedder, vector store,
//! relational store, reranker) wraps its own errors in a local enum, but
//! every such enum carries a [`ErrorKind`] so callers can apply the
//! propagation policy from the spec uniformly (recover locally, degrade,
//! or fail the request) without matching on crate-specific variants.

use thiserror::Error;

/// The taxonomy of error kinds a component can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: bad selector, empty query, unknown scope level.
    Validation,
    /// Named entity absent when the caller required existence.
    NotFound,
    /// Retryable failure of an external call (embed/vector/relational/rerank).
    Transient,
    /// Non-retryable failure: dimension mismatch, sanitization collision, cap exceeded.
    Permanent,
    /// Cooperative cancellation.
    Cancelled,
}

/// A generic error carrying one of the taxonomy kinds plus a message.
///
/// Crate-specific error enums should prefer their own `thiserror` types
/// and implement [`HasErrorKind`]; `SemscopeError` exists for call sites
/// that need to cross a crate boundary without depending on every
/// downstream error type.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct SemscopeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SemscopeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permanent, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "cancelled")
    }

    /// Whether a caller may retry this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Transient)
    }
}

/// Implemented by crate-specific error enums so generic code can inspect
/// the taxonomy without a full conversion.
pub trait HasErrorKind {
    fn error_kind(&self) -> ErrorKind;
}

impl HasErrorKind for SemscopeError {
    fn error_kind(&self) -> ErrorKind {
        self.kind
    }
}
