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

use semscope_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkerError {
    #[error("empty input at {path}")]
    EmptyInput { path: String },
    #[error("content is not valid UTF-8 at {path}")]
    InvalidEncoding { path: String },
}

impl ChunkerError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ChunkerError::EmptyInput { .. } => ErrorKind::Validation,
            ChunkerError::InvalidEncoding { .. } => ErrorKind::Validation,
        }
    }
}
