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

//! Shared application state, grounded on `agentreplay-server/src/api/
//! query.rs`'s `AppState` (one `Clone`-able struct of `Arc`-wrapped
//! components passed into every handler via axum's `State` extractor).
//! This surface carries no business logic of its own (§10); every field
//! is a handle into a crate that owns its component.

use std::sync::Arc;

use semscope_index::QdrantVectorStore;
use semscope_ingest::IngestionOrchestrator;
use semscope_providers::{DisabledSparseEncoder, HttpEmbedder, NoopReranker};
use semscope_query::HybridQueryEngine;
use semscope_storage::PgRelationalStore;

pub type Orchestrator = IngestionOrchestrator<HttpEmbedder, DisabledSparseEncoder, QdrantVectorStore, PgRelationalStore>;
pub type Engine = HybridQueryEngine<HttpEmbedder, DisabledSparseEncoder, QdrantVectorStore, PgRelationalStore, NoopReranker>;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<PgRelationalStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub engine: Arc<Engine>,
}
