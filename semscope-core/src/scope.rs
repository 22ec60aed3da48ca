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

//! Scope / Collection Resolver (C1, §4.1).
//!
//! Collection naming is a pure function of scope; access-set resolution
//! is a pure function over in-memory dataset/share snapshots so this
//! crate never has to know how the relational store fetches them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::model::{Dataset, ProjectShare};

/// Visibility level a collection is resolved at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Project,
    Local,
}

/// `sanitize(s) = lower(s) -> replace /[^a-z0-9]+/ with "_" -> trim "_"`.
///
/// Idempotent: `sanitize(sanitize(s)) == sanitize(s)` (testable property 1).
pub fn sanitize(s: &str) -> String {
    static NON_ALNUM: once_regex::Lazy<Regex> =
        once_regex::Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
    let lowered = s.to_lowercase();
    let replaced = NON_ALNUM.replace_all(&lowered, "_");
    replaced.trim_matches('_').to_string()
}

/// A minimal lazy-cell so we don't need an extra workspace dependency
/// just for a single compiled regex.
mod once_regex {
    use std::sync::OnceLock;

    pub struct Lazy<T> {
        cell: OnceLock<T>,
        init: fn() -> T,
    }

    impl<T> Lazy<T> {
        pub const fn new(init: fn() -> T) -> Self {
            Self {
                cell: OnceLock::new(),
                init,
            }
        }
    }

    impl<T> std::ops::Deref for Lazy<T> {
        type Target = T;
        fn deref(&self) -> &T {
            self.cell.get_or_init(self.init)
        }
    }
}

/// Pure naming and access-set resolution.
pub struct ScopeResolver;

impl ScopeResolver {
    /// Collection name is a pure function of scope (§4.1, §6):
    ///
    /// - `global` → `"global_knowledge"`
    /// - `project` → `"project_" + sanitize(project)`
    /// - `local` → `"project_" + sanitize(project) + "_dataset_" + sanitize(dataset)`
    pub fn name_for(scope: Scope, project: Option<&str>, dataset: Option<&str>) -> String {
        match scope {
            Scope::Global => "global_knowledge".to_string(),
            Scope::Project => format!("project_{}", sanitize(project.unwrap_or_default())),
            Scope::Local => format!(
                "project_{}_dataset_{}",
                sanitize(project.unwrap_or_default()),
                sanitize(dataset.unwrap_or_default())
            ),
        }
    }

    /// `accessible_dataset_ids = {d : d.project_id = p} ∪ (include_global
    /// ? {d : d.project_id = NULL} : ∅) ∪ {d : d ∈ ProjectShare(to=p,
    /// unexpired)}` (§4.1). Ordered by first appearance in `datasets`.
    pub fn accessible_datasets(
        project_id: Uuid,
        datasets: &[Dataset],
        shares: &[ProjectShare],
        include_global: bool,
        now: DateTime<Utc>,
    ) -> Vec<Uuid> {
        let shared_ids: HashSet<Uuid> = shares
            .iter()
            .filter(|s| s.to_project == project_id && !s.is_expired(now))
            .map(|s| s.resource_id)
            .collect();

        datasets
            .iter()
            .filter(|d| {
                d.project_id == Some(project_id)
                    || (include_global && d.is_global())
                    || shared_ids.contains(&d.id)
            })
            .map(|d| d.id)
            .collect()
    }

    /// Resolution for the `project == ALL` sentinel query (§4.9 step 1):
    /// every dataset id, optionally including global ones.
    pub fn all_datasets(datasets: &[Dataset], include_global: bool) -> Vec<Uuid> {
        datasets
            .iter()
            .filter(|d| d.project_id.is_some() || include_global)
            .map(|d| d.id)
            .collect()
    }
}
