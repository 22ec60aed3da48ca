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

//! Subcommand handlers. Each builds the concrete stack (storage, vector
//! store, providers) from `Cli` and calls straight into the crate that
//! owns the relevant component; no retrieval/ingestion logic lives here.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use uuid::Uuid;

use semscope_changedet::WalkConfig;
use semscope_core::config::SemscopeConfig;
use semscope_core::pattern::DatasetSelector;
use semscope_ingest::{CancellationToken, IngestRequest, IngestSource, IngestionOrchestrator, Provenance, WebPage};
use semscope_index::QdrantVectorStore;
use semscope_providers::{DisabledSparseEncoder, HttpEmbedder, NoopReranker};
use semscope_query::{check_index, HybridQueryEngine, IndexStatusRequest, QueryRequest, QueryScope};
use semscope_storage::{PgRelationalStore, RelationalStore};

use crate::cli::{Cli, Commands};

type Orchestrator = IngestionOrchestrator<HttpEmbedder, DisabledSparseEncoder, QdrantVectorStore, PgRelationalStore>;
type Engine = HybridQueryEngine<HttpEmbedder, DisabledSparseEncoder, QdrantVectorStore, PgRelationalStore, NoopReranker>;

struct Stack {
    storage: Arc<PgRelationalStore>,
    vector_store: Arc<QdrantVectorStore>,
    embedder: Arc<HttpEmbedder>,
    sparse_encoder: Arc<DisabledSparseEncoder>,
    config: SemscopeConfig,
}

async fn connect(cli: &Cli) -> Result<Stack> {
    let config = SemscopeConfig::load(cli.config.as_deref()).context("loading semscope config")?;

    let storage = PgRelationalStore::connect(&cli.database_url)
        .await
        .context("connecting to the relational store")?;
    let vector_store = QdrantVectorStore::connect(&cli.qdrant_url).context("connecting to the vector store")?;
    let embedder = HttpEmbedder::new(
        cli.embedding_api_key.clone(),
        cli.embedding_model.clone(),
        cli.embedding_base_url.clone(),
        cli.embedding_dimension,
    );

    Ok(Stack {
        storage: Arc::new(storage),
        vector_store: Arc::new(vector_store),
        embedder: Arc::new(embedder),
        sparse_encoder: Arc::new(DisabledSparseEncoder),
        config,
    })
}

fn orchestrator(stack: &Stack) -> Orchestrator {
    IngestionOrchestrator::new(
        stack.embedder.clone(),
        stack.sparse_encoder.clone(),
        stack.vector_store.clone(),
        stack.storage.clone(),
        stack.config.chunker.clone(),
        stack.config.embedding.clone(),
    )
}

fn engine(stack: &Stack) -> Engine {
    HybridQueryEngine::new(
        stack.embedder.clone(),
        stack.sparse_encoder.clone(),
        stack.vector_store.clone(),
        stack.storage.clone(),
        Arc::new(NoopReranker),
        stack.config.query.clone(),
    )
}

pub async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Migrate => run_migrate(&cli).await,
        Commands::IngestCodebase { .. } => run_ingest_codebase(&cli).await,
        Commands::IngestPages { .. } => run_ingest_pages(&cli).await,
        Commands::Query { .. } => run_query(&cli).await,
        Commands::Status { .. } => run_status(&cli).await,
    }
}

async fn run_migrate(cli: &Cli) -> Result<()> {
    let storage = PgRelationalStore::connect(&cli.database_url).await.context("connecting to the relational store")?;
    storage.run_migrations().await.context("running migrations")?;
    println!("migrations applied");
    Ok(())
}

async fn run_ingest_codebase(cli: &Cli) -> Result<()> {
    let Commands::IngestCodebase { project, dataset, path, extensions, global_ignore, force, repo, branch, sha } =
        &cli.command
    else {
        unreachable!()
    };

    let stack = connect(cli).await?;
    let orch = orchestrator(&stack);

    let walk_config = WalkConfig {
        root: path.clone(),
        extensions: extensions.iter().cloned().collect::<HashSet<_>>(),
        global_ignore: global_ignore.clone(),
    };
    let req = IngestRequest {
        project: project.clone(),
        dataset: dataset.clone(),
        provenance: Provenance { repo: repo.clone(), branch: branch.clone(), sha: sha.clone() },
        force: *force,
    };

    let result = orch
        .ingest(&req, IngestSource::Codebase(walk_config), None, &CancellationToken::new())
        .await
        .context("ingesting codebase")?;

    println!(
        "indexed {} files, skipped {}, deleted {}, {} chunks total ({:?}) into collection {}",
        result.files_indexed, result.files_skipped, result.files_deleted, result.total_chunks, result.status, result.collection_name
    );
    Ok(())
}

async fn run_ingest_pages(cli: &Cli) -> Result<()> {
    let Commands::IngestPages { project, dataset, file, force, repo, branch, sha } = &cli.command else {
        unreachable!()
    };

    let stack = connect(cli).await?;
    let orch = orchestrator(&stack);

    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let pages: Vec<WebPage> = serde_json::from_str(&raw).context("parsing pages JSON")?;

    let req = IngestRequest {
        project: project.clone(),
        dataset: dataset.clone(),
        provenance: Provenance { repo: repo.clone(), branch: branch.clone(), sha: sha.clone() },
        force: *force,
    };

    let result = orch
        .ingest(&req, IngestSource::PageSet(pages), None, &CancellationToken::new())
        .await
        .context("ingesting pages")?;

    println!(
        "indexed {} pages, {} chunks total ({:?}) into collection {}",
        result.files_indexed, result.total_chunks, result.status, result.collection_name
    );
    Ok(())
}

/// Resolves the project and its full dataset snapshot into a
/// [`QueryScope`] (§4.1 access-set resolution): every dataset the
/// project owns, plus every global dataset, so `ScopeResolver` (invoked
/// inside the engine) can apply `include_global`/sharing itself rather
/// than have the caller pre-filter. No `--project-share` support yet;
/// project sharing is a server/admin concern this CLI doesn't expose.
async fn resolve_scope(storage: &PgRelationalStore, project: &str) -> Result<(Uuid, QueryScope)> {
    let project_id = storage.get_or_create_project(project).await.context("resolving project")?;

    let mut datasets =
        storage.list_datasets_for_project(project_id).await.context("listing project datasets")?;
    datasets.extend(storage.list_global_datasets().await.context("listing global datasets")?);

    Ok((project_id, QueryScope { project_id: Some(project_id), datasets, shares: Vec::new() }))
}

async fn run_query(cli: &Cli) -> Result<()> {
    let Commands::Query { project, select, query, top_k, threshold, repo, lang, path_prefix, include_global, json } =
        &cli.command
    else {
        unreachable!()
    };

    let stack = connect(cli).await?;
    let eng = engine(&stack);
    let (project_id, scope) = resolve_scope(&stack.storage, project).await?;

    let req = QueryRequest {
        project: project.clone(),
        dataset_selector: select.clone().map(DatasetSelector::Single),
        query: query.clone(),
        top_k: *top_k,
        threshold: *threshold,
        repo: repo.clone(),
        lang: lang.clone(),
        path_prefix: path_prefix.clone(),
        include_global: *include_global,
    };
    let _ = project_id;

    let response = eng.search(req, scope).await.context("running query")?;

    if *json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.message);
        for result in &response.results {
            println!(
                "{:.3}  {}:{}-{}  {}",
                result.scores.final_score, result.file, result.line_span.start, result.line_span.end, result.symbol.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}

async fn run_status(cli: &Cli) -> Result<()> {
    let Commands::Status { project, dataset, path, details, json } = &cli.command else { unreachable!() };

    let stack = connect(cli).await?;
    let project_id = stack.storage.get_or_create_project(project).await.context("resolving project")?;
    let dataset_id =
        stack.storage.get_or_create_dataset(Some(project_id), dataset).await.context("resolving dataset")?;

    let walk_config = WalkConfig { root: path.clone(), extensions: HashSet::new(), global_ignore: None };
    let status_req =
        IndexStatusRequest { codebase_path: PathBuf::from(path), project_id, dataset_id, with_details: *details };

    let response = check_index(stack.storage.as_ref(), &walk_config, &status_req).await.context("checking index status")?;

    if *json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.message);
        println!(
            "indexed={} fully_indexed={} needs_reindex={} recommendation={:?}",
            response.is_indexed, response.is_fully_indexed, response.needs_reindex, response.recommendation
        );
    }
    Ok(())
}
