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

//! POST /v1/query (C9, §4.9).

use axum::{extract::State, Json};
use serde::Deserialize;

use semscope_core::pattern::DatasetSelector;
use semscope_query::{QueryRequest, QueryResponse};

use crate::error::ApiError;
use crate::scope::resolve_scope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub project: String,
    #[serde(default)]
    pub dataset_selector: Option<DatasetSelector>,
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f32>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub include_global: bool,
}

pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let (_, scope) = resolve_scope(&state.storage, &body.project).await?;

    let req = QueryRequest {
        project: body.project,
        dataset_selector: body.dataset_selector,
        query: body.query,
        top_k: body.top_k,
        threshold: body.threshold,
        repo: body.repo,
        lang: body.lang,
        path_prefix: body.path_prefix,
        include_global: body.include_global,
    };

    let response = state.engine.search(req, scope).await?;
    Ok(Json(response))
}
