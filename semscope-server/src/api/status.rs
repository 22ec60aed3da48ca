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

//! GET /v1/status (C10, §4.10).

use std::collections::HashSet;
use std::path::PathBuf;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use semscope_changedet::WalkConfig;
use semscope_query::{check_index, IndexStatusRequest, IndexStatusResponse};
use semscope_storage::RelationalStore;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub project: String,
    pub dataset: String,
    pub path: PathBuf,
    #[serde(default)]
    pub details: bool,
}

pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<IndexStatusResponse>, ApiError> {
    let project_id = state.storage.get_or_create_project(&params.project).await?;
    let dataset_id = state.storage.get_or_create_dataset(Some(project_id), &params.dataset).await?;

    let walk_config = WalkConfig { root: params.path.clone(), extensions: HashSet::new(), global_ignore: None };
    let req = IndexStatusRequest {
        codebase_path: params.path,
        project_id,
        dataset_id,
        with_details: params.details,
    };

    let response = check_index(state.storage.as_ref(), &walk_config, &req).await?;
    Ok(Json(response))
}
