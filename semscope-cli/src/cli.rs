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

//! Command-line surface: thin clap wiring over C8 (ingest) and C9/C10
//! (query, status). No business logic lives here.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "semscope")]
#[command(about = "Project-scoped semantic code/document search", long_about = None)]
pub struct Cli {
    /// Postgres connection string for the Relational Store Gateway (C7).
    #[arg(long, env = "SEMSCOPE_DATABASE_URL")]
    pub database_url: String,

    /// Qdrant endpoint for the Vector Store Gateway (C6).
    #[arg(long, env = "SEMSCOPE_QDRANT_URL", default_value = "http://localhost:6334")]
    pub qdrant_url: String,

    /// API key for the default HTTP embedding provider.
    #[arg(long, env = "SEMSCOPE_EMBEDDING_API_KEY")]
    pub embedding_api_key: String,

    /// Embedding model name passed to the provider.
    #[arg(long, env = "SEMSCOPE_EMBEDDING_MODEL", default_value = "text-embedding-3-small")]
    pub embedding_model: String,

    /// Base URL of an OpenAI-compatible embeddings endpoint.
    #[arg(long, env = "SEMSCOPE_EMBEDDING_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub embedding_base_url: String,

    /// Dimension of the configured embedding model's vectors.
    #[arg(long, env = "SEMSCOPE_EMBEDDING_DIMENSION", default_value_t = 1536)]
    pub embedding_dimension: usize,

    /// Optional TOML config file layered over the built-in defaults (§11).
    #[arg(long)]
    pub config: Option<String>,

    /// Raise the default log level to debug.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pending Postgres migrations (§11 configuration/storage setup).
    Migrate,

    /// Ingest a codebase directory (C8, §4.8).
    IngestCodebase {
        /// Project name; sanitized per §4.1 and created if it doesn't exist.
        #[arg(long)]
        project: String,

        /// Dataset name within the project.
        #[arg(long)]
        dataset: String,

        /// Root directory to walk.
        #[arg(long)]
        path: PathBuf,

        /// Comma-separated extension allowlist (without dots); empty allows all text files.
        #[arg(long, value_delimiter = ',')]
        extensions: Vec<String>,

        /// Optional global ignore file, merged with the tree's own ignore files (§4.4).
        #[arg(long)]
        global_ignore: Option<PathBuf>,

        /// Bypass the change detector and reindex every candidate file.
        #[arg(long)]
        force: bool,

        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        sha: Option<String>,
    },

    /// Ingest a JSON array of `{relative_path, content}` pages (C8, §4.8).
    IngestPages {
        #[arg(long)]
        project: String,
        #[arg(long)]
        dataset: String,

        /// Path to a JSON file containing an array of pages.
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        force: bool,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        sha: Option<String>,
    },

    /// Run a hybrid query (C9, §4.9).
    Query {
        /// Project name, or the `all` sentinel to search across every accessible project.
        #[arg(long)]
        project: String,

        /// Selector pattern applied against the project's accessible
        /// datasets (exact name, glob, or the semantic aliases in §4.2),
        /// fetched from the Relational Store Gateway. Defaults to all of
        /// them.
        #[arg(long)]
        select: Option<String>,

        /// Query text.
        query: String,

        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        threshold: Option<f32>,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        path_prefix: Option<String>,

        /// Also search global (project-less) datasets.
        #[arg(long)]
        include_global: bool,

        /// Print the full response as JSON instead of a human summary.
        #[arg(long)]
        json: bool,
    },

    /// Check whether a codebase path is indexed and up to date (C10, §4.10).
    Status {
        #[arg(long)]
        project: String,
        #[arg(long)]
        dataset: String,
        #[arg(long)]
        path: PathBuf,

        /// Include up to 10 example paths per new/modified/deleted bucket.
        #[arg(long)]
        details: bool,

        #[arg(long)]
        json: bool,
    },
}
