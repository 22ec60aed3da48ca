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

//! Semscope Core
//!
//! Shared data model, error taxonomy, configuration, and the two
//! deterministic resolvers (scope/collection naming and dataset pattern
//! expansion) that every other crate in the workspace depends on.

pub mod config;
pub mod error;
pub mod model;
pub mod pattern;
pub mod scope;

pub use error::{ErrorKind, SemscopeError};
pub use model::{
    Chunk, ChunkSource, Collection, Dataset, DatasetStatus, IndexedFile, Project, ProjectShare,
    SparseVector, Symbol,
};
pub use pattern::{DatasetPatternResolver, ResolutionDiagnostics};
pub use scope::{sanitize, Scope, ScopeResolver};

/// Case-insensitive sentinel project name meaning "all projects".
pub const ALL_PROJECTS_SENTINEL: &str = "all";

/// Returns true if `name` is the reserved all-projects sentinel.
pub fn is_all_sentinel(name: &str) -> bool {
    name.eq_ignore_ascii_case(ALL_PROJECTS_SENTINEL)
}
