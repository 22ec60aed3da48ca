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

//! Vector Store Gateway (C6, §4.6).

mod error;
mod fusion;
mod gateway;
mod model;

pub use error::IndexError;
pub use fusion::{fuse, FusionMethod};
pub use gateway::{QdrantVectorStore, VectorStore};
pub use model::{SearchFilter, SearchHit, SearchParams, VectorDocument};
