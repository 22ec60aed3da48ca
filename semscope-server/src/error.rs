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

//! HTTP error mapping for the axum handlers (§7 error taxonomy ->
//! status code), grounded on `agentreplay-server/src/api/query.rs`'s
//! `ApiError`/`ErrorResponse` shape.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use semscope_core::ErrorKind;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Permanent => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Cancelled => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(kind = ?self.kind, message = %self.message, "request failed");
        (status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<semscope_ingest::IngestError> for ApiError {
    fn from(e: semscope_ingest::IngestError) -> Self {
        Self { kind: e.error_kind(), message: e.to_string() }
    }
}

impl From<semscope_query::QueryError> for ApiError {
    fn from(e: semscope_query::QueryError) -> Self {
        Self { kind: e.error_kind(), message: e.to_string() }
    }
}

impl From<semscope_storage::StorageError> for ApiError {
    fn from(e: semscope_storage::StorageError) -> Self {
        Self { kind: e.error_kind(), message: e.to_string() }
    }
}
