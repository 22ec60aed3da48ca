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

//! Default implementations of the external-interface traits (§6)
//! `semscope-cli` and `semscope-server` wire in so both binaries are
//! runnable without every caller writing their own embedder/reranker.
//! Neither `semscope-embeddings` nor `semscope-query` depend on this
//! crate; any other implementation of their traits works just as well.

pub mod embedder;
pub mod reranker;

pub use embedder::{DisabledSparseEncoder, HttpEmbedder};
pub use reranker::NoopReranker;
