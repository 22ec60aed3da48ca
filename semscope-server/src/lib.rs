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

//! HTTP entry point exposing C8 (ingest), C9 (query) and C10 (status) as a
//! thin axum service. No retrieval/ingestion logic lives here; every
//! handler delegates straight into the crate owning the relevant
//! component (§10 Non-goals — this surface adds no business rules of
//! its own).

pub mod api;
pub mod config;
pub mod error;
pub mod scope;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use semscope_ingest::IngestionOrchestrator;
use semscope_index::QdrantVectorStore;
use semscope_providers::{DisabledSparseEncoder, HttpEmbedder, NoopReranker};
use semscope_query::HybridQueryEngine;
use semscope_storage::PgRelationalStore;

pub use config::ServerConfig;
use state::AppState;

/// Builds the component stack, assembles the router and serves it until
/// the process is killed. Mirrors the teacher's `run_server` shape: init
/// tracing, connect dependencies, build state, bind and serve.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let storage = PgRelationalStore::connect(&config.database_url)
        .await
        .context("connecting to the relational store")?;
    storage.run_migrations().await.context("running migrations")?;

    let vector_store =
        QdrantVectorStore::connect(&config.qdrant_url).context("connecting to the vector store")?;
    let embedder = HttpEmbedder::new(
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
        config.embedding_base_url.clone(),
        config.embedding_dimension,
    );
    let sparse_encoder = DisabledSparseEncoder;

    let storage = Arc::new(storage);
    let vector_store = Arc::new(vector_store);
    let embedder = Arc::new(embedder);
    let sparse_encoder = Arc::new(sparse_encoder);

    let orchestrator = Arc::new(IngestionOrchestrator::new(
        embedder.clone(),
        sparse_encoder.clone(),
        vector_store.clone(),
        storage.clone(),
        config.semscope.chunker.clone(),
        config.semscope.embedding.clone(),
    ));
    let engine = Arc::new(HybridQueryEngine::new(
        embedder,
        sparse_encoder,
        vector_store,
        storage.clone(),
        Arc::new(NoopReranker),
        config.semscope.query.clone(),
    ));

    let state = AppState { storage, orchestrator, engine };

    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse())
            .collect::<Result<Vec<_>, _>>()
            .context("parsing cors_origins")?;
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    };

    let app = Router::new()
        .route("/health", get(api::health::health))
        .route("/v1/ingest/codebase", post(api::ingest::ingest_codebase))
        .route("/v1/ingest/pages", post(api::ingest::ingest_pages))
        .route("/v1/query", post(api::query::search))
        .route("/v1/status", get(api::status::status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "semscope-server listening");

    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
