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

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("collection dimension cannot change after creation: existing={existing}, requested={requested}")]
    DimensionMismatch { existing: u32, requested: u32 },
}

impl StorageError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            StorageError::Database(e) => match e {
                sqlx::Error::RowNotFound => ErrorKind::NotFound,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => ErrorKind::Transient,
                _ => ErrorKind::Transient,
            },
            StorageError::Migration(_) => ErrorKind::Permanent,
            StorageError::DimensionMismatch { .. } => ErrorKind::Permanent,
        }
    }
}
