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

//! Builds a [`QueryScope`] for the query handler (§4.1 access-set
//! resolution): every dataset the project owns, plus every global
//! dataset, fetched from the Relational Store Gateway. `ScopeResolver`
//! (invoked inside the engine) applies `include_global`/sharing on top
//! of this snapshot. Project sharing (`ProjectShare` rows) is left
//! empty here; this surface doesn't expose cross-project administration.

use uuid::Uuid;

use semscope_query::QueryScope;
use semscope_storage::{PgRelationalStore, RelationalStore};

use crate::error::ApiError;

pub async fn resolve_scope(storage: &PgRelationalStore, project: &str) -> Result<(Uuid, QueryScope), ApiError> {
    let project_id = storage.get_or_create_project(project).await?;

    let mut datasets = storage.list_datasets_for_project(project_id).await?;
    datasets.extend(storage.list_global_datasets().await?);

    Ok((project_id, QueryScope { project_id: Some(project_id), datasets, shares: Vec::new() }))
}
