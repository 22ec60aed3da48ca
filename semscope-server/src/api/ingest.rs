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

//! POST /v1/ingest/codebase, POST /v1/ingest/pages (C8, §4.8).

use std::collections::HashSet;
use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::Deserialize;

use semscope_changedet::WalkConfig;
use semscope_ingest::{CancellationToken, IngestJobResult, IngestRequest, IngestSource, Provenance, WebPage};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestCodebaseRequest {
    pub project: String,
    pub dataset: String,
    pub path: PathBuf,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub global_ignore: Option<PathBuf>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

pub async fn ingest_codebase(
    State(state): State<AppState>,
    Json(body): Json<IngestCodebaseRequest>,
) -> Result<Json<IngestJobResult>, ApiError> {
    let walk_config = WalkConfig {
        root: body.path,
        extensions: body.extensions.into_iter().collect::<HashSet<_>>(),
        global_ignore: body.global_ignore,
    };
    let req = IngestRequest {
        project: body.project,
        dataset: body.dataset,
        provenance: Provenance { repo: body.repo, branch: body.branch, sha: body.sha },
        force: body.force,
    };

    let result = state
        .orchestrator
        .ingest(&req, IngestSource::Codebase(walk_config), None, &CancellationToken::new())
        .await?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct IngestPagesRequest {
    pub project: String,
    pub dataset: String,
    pub pages: Vec<WebPage>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

pub async fn ingest_pages(
    State(state): State<AppState>,
    Json(body): Json<IngestPagesRequest>,
) -> Result<Json<IngestJobResult>, ApiError> {
    let req = IngestRequest {
        project: body.project,
        dataset: body.dataset,
        provenance: Provenance { repo: body.repo, branch: body.branch, sha: body.sha },
        force: body.force,
    };

    let result = state
        .orchestrator
        .ingest(&req, IngestSource::PageSet(body.pages), None, &CancellationToken::new())
        .await?;

    Ok(Json(result))
}
