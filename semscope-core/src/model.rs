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

//! Data model (§3): Project, Dataset, Collection, IndexedFile, the chunk
//! payload, and the vector/sparse-vector/share types that sit alongside
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// `(id, name)`. `name` is unique and sanitized; see [`crate::scope::sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
}

/// Lifecycle status of a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    Active,
    Indexing,
    Error,
}

/// `(id, project_id, name, status)`. `project_id = None` denotes a
/// **global** dataset, queryable from every project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub name: String,
    pub status: DatasetStatus,
}

impl Dataset {
    pub fn is_global(&self) -> bool {
        self.project_id.is_none()
    }
}

/// One collection per dataset (unique constraint). `name` is derived
/// deterministically by [`crate::scope::ScopeResolver::name_for`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub dataset_id: Uuid,
    pub name: String,
    pub backend: String,
    pub dimension: u32,
    pub hybrid: bool,
    /// Advisory; authoritative count lives in the vector store.
    pub point_count: u64,
    pub last_indexed_at: Option<DateTime<Utc>>,
}

/// A row tracking the last-indexed state of one file within a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFile {
    pub project_id: Uuid,
    pub dataset_id: Uuid,
    pub relative_path: String,
    pub content_hash: String,
    pub file_size: u64,
    pub chunk_count: u32,
    pub last_indexed_at: DateTime<Utc>,
    pub language: Option<String>,
}

/// Where a chunk's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkSource {
    Code,
    WebPage,
}

/// A named code symbol a chunk is anchored to (function, class, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: String,
}

/// The chunk payload stored inside the vector store (§3). Declared keys
/// are typed; anything a caller wants to pass through opaquely goes in
/// `extra` (see Design Notes §9 "dynamic schema").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub project_id: Uuid,
    pub dataset_id: Uuid,
    pub source_type: ChunkSource,
    pub relative_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub chunk_index: u32,
    pub content: String,
    pub file_extension: Option<String>,
    pub language: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub chunk_title: Option<String>,
    pub symbol: Option<Symbol>,
    pub title: Option<String>,
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Computes the stable chunk id: identical inputs always produce the
/// same id, which is what makes upsert idempotent (invariant 2, §3;
/// testable property 2, §8).
///
/// `"chunk_" + hex(sha256(relative_path ":" start_line ":" end_line ":" chunk_index ":" content))[0..16]`
pub fn chunk_id(relative_path: &str, start_line: u32, end_line: u32, chunk_index: u32, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(relative_path.as_bytes());
    hasher.update(b":");
    hasher.update(start_line.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(end_line.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(chunk_index.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    format!("chunk_{}", &hex::encode(digest)[0..16])
}

/// `(indices[], values[])`, length-matched, non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// A sparse vector is well-formed when indices and values are
    /// length-matched and every value is non-negative.
    pub fn is_valid(&self) -> bool {
        self.indices.len() == self.values.len() && self.values.iter().all(|v| *v >= 0.0)
    }
}

/// Grants `to_project` read-access to one resource owned by `from_project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectShare {
    pub from_project: Uuid,
    pub to_project: Uuid,
    pub resource_type: String,
    pub resource_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProjectShare {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Stable digest of file bytes, used by the change detector (§4.4) for
/// content comparison.
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Replaces any unpaired UTF-16 surrogate code unit (U+D800..U+DFFF)
/// with the replacement character before hashing or embedding (§4.3,
/// testable property 8). Inputs that arrive as raw UTF-16 code units
/// (e.g. decoded from a source that preserved lone surrogates) are the
/// case this guards; well-formed `&str` already can't contain one.
pub fn sanitize_utf16(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
