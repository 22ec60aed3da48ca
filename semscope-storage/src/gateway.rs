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

//! Relational Store Gateway (C7, §4.7): a postgres-backed implementation
//! over the schema in `migrations/0001_init.sql`. Chunk content lives in
//! the vector store; this crate only tracks the bookkeeping rows needed
//! to answer "what do we have" and "where is it".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use semscope_core::{scope::sanitize, Collection, Dataset, DatasetStatus, IndexedFile};

use crate::error::StorageError;

#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn get_or_create_project(&self, name: &str) -> Result<Uuid, StorageError>;
    async fn get_or_create_dataset(&self, project_id: Option<Uuid>, name: &str) -> Result<Uuid, StorageError>;
    /// All datasets owned by `project_id` (§4.1 access-set resolution:
    /// the `{d : d.project_id = p}` term). Callers building a
    /// [`semscope_core::scope::ScopeResolver`] snapshot combine this with
    /// [`RelationalStore::list_global_datasets`].
    async fn list_datasets_for_project(&self, project_id: Uuid) -> Result<Vec<Dataset>, StorageError>;
    /// Every dataset with `project_id IS NULL` (§4.1's `include_global`
    /// term). Queryable from any project once unioned in by the caller.
    async fn list_global_datasets(&self) -> Result<Vec<Dataset>, StorageError>;
    async fn get_or_create_collection_record(
        &self,
        dataset_id: Uuid,
        name: &str,
        backend: &str,
        dimension: u32,
        hybrid: bool,
    ) -> Result<Uuid, StorageError>;
    async fn update_collection_metadata(&self, name: &str, point_count: u64) -> Result<(), StorageError>;
    async fn resolve_collections_for(&self, dataset_ids: &[Uuid]) -> Result<Vec<String>, StorageError>;
    async fn get_collection_by_dataset(&self, dataset_id: Uuid) -> Result<Option<Collection>, StorageError>;
    async fn insert_indexed_files(&self, rows: &[IndexedFile]) -> Result<(), StorageError>;
    async fn delete_indexed_file(&self, project_id: Uuid, dataset_id: Uuid, relative_path: &str) -> Result<(), StorageError>;
    async fn get_indexed_files(&self, project_id: Uuid, dataset_id: Uuid) -> Result<Vec<IndexedFile>, StorageError>;
    async fn count_indexed_files(&self, project_id: Uuid, dataset_id: Uuid) -> Result<i64, StorageError>;
    async fn clear_dataset(&self, dataset_id: Uuid) -> Result<(), StorageError>;
}

pub struct PgRelationalStore {
    pool: PgPool,
}

impl PgRelationalStore {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_indexed_file(row: &sqlx::postgres::PgRow) -> IndexedFile {
        IndexedFile {
            project_id: row.get("project_id"),
            dataset_id: row.get("dataset_id"),
            relative_path: row.get("relative_path"),
            content_hash: row.get("content_hash"),
            file_size: row.get::<i64, _>("file_size") as u64,
            chunk_count: row.get::<i32, _>("chunk_count") as u32,
            last_indexed_at: row.get("last_indexed_at"),
            language: row.get("language"),
        }
    }

    fn row_to_dataset(row: &sqlx::postgres::PgRow) -> Dataset {
        Dataset {
            id: row.get("id"),
            project_id: row.get("project_id"),
            name: row.get("name"),
            status: match row.get::<String, _>("status").as_str() {
                "indexing" => DatasetStatus::Indexing,
                "error" => DatasetStatus::Error,
                _ => DatasetStatus::Active,
            },
        }
    }

    fn row_to_collection(row: &sqlx::postgres::PgRow) -> Collection {
        Collection {
            id: row.get("id"),
            dataset_id: row.get("dataset_id"),
            name: row.get("name"),
            backend: row.get("backend"),
            dimension: row.get::<i32, _>("dimension") as u32,
            hybrid: row.get("hybrid"),
            point_count: row.get::<i64, _>("point_count") as u64,
            last_indexed_at: row.get("last_indexed_at"),
        }
    }
}

#[async_trait]
impl RelationalStore for PgRelationalStore {
    async fn get_or_create_project(&self, name: &str) -> Result<Uuid, StorageError> {
        let sanitized = sanitize(name);

        if let Some(row) = sqlx::query(
            "INSERT INTO projects (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&sanitized)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(row.get("id"));
        }

        let row = sqlx::query("SELECT id FROM projects WHERE name = $1")
            .bind(&sanitized)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("id"))
    }

    async fn get_or_create_dataset(&self, project_id: Option<Uuid>, name: &str) -> Result<Uuid, StorageError> {
        let sanitized = sanitize(name);

        let inserted = match project_id {
            Some(pid) => {
                sqlx::query(
                    "INSERT INTO datasets (id, project_id, name) VALUES ($1, $2, $3) \
                     ON CONFLICT (project_id, name) DO NOTHING RETURNING id",
                )
                .bind(Uuid::new_v4())
                .bind(pid)
                .bind(&sanitized)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "INSERT INTO datasets (id, project_id, name) VALUES ($1, NULL, $2) \
                     ON CONFLICT (name) WHERE project_id IS NULL DO NOTHING RETURNING id",
                )
                .bind(Uuid::new_v4())
                .bind(&sanitized)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        if let Some(row) = inserted {
            return Ok(row.get("id"));
        }

        let row = match project_id {
            Some(pid) => {
                sqlx::query("SELECT id FROM datasets WHERE project_id = $1 AND name = $2")
                    .bind(pid)
                    .bind(&sanitized)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT id FROM datasets WHERE project_id IS NULL AND name = $1")
                    .bind(&sanitized)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(row.get("id"))
    }

    async fn list_datasets_for_project(&self, project_id: Uuid) -> Result<Vec<Dataset>, StorageError> {
        let rows = sqlx::query("SELECT id, project_id, name, status FROM datasets WHERE project_id = $1")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::row_to_dataset).collect())
    }

    async fn list_global_datasets(&self) -> Result<Vec<Dataset>, StorageError> {
        let rows = sqlx::query("SELECT id, project_id, name, status FROM datasets WHERE project_id IS NULL")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::row_to_dataset).collect())
    }

    async fn get_or_create_collection_record(
        &self,
        dataset_id: Uuid,
        name: &str,
        backend: &str,
        dimension: u32,
        hybrid: bool,
    ) -> Result<Uuid, StorageError> {
        if let Some(row) = sqlx::query(
            "INSERT INTO dataset_collections (id, dataset_id, name, backend, dimension, hybrid) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (dataset_id) DO NOTHING RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(dataset_id)
        .bind(name)
        .bind(backend)
        .bind(dimension as i32)
        .bind(hybrid)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(row.get("id"));
        }

        let row = sqlx::query("SELECT id, dimension FROM dataset_collections WHERE dataset_id = $1")
            .bind(dataset_id)
            .fetch_one(&self.pool)
            .await?;
        let existing_dimension = row.get::<i32, _>("dimension") as u32;
        if existing_dimension != dimension {
            return Err(StorageError::DimensionMismatch { existing: existing_dimension, requested: dimension });
        }
        Ok(row.get("id"))
    }

    async fn update_collection_metadata(&self, name: &str, point_count: u64) -> Result<(), StorageError> {
        sqlx::query("UPDATE dataset_collections SET point_count = $1, last_indexed_at = now() WHERE name = $2")
            .bind(point_count as i64)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn resolve_collections_for(&self, dataset_ids: &[Uuid]) -> Result<Vec<String>, StorageError> {
        if dataset_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query("SELECT name FROM dataset_collections WHERE dataset_id = ANY($1)")
            .bind(dataset_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.get("name")).collect())
    }

    async fn get_collection_by_dataset(&self, dataset_id: Uuid) -> Result<Option<Collection>, StorageError> {
        let row = sqlx::query(
            "SELECT id, dataset_id, name, backend, dimension, hybrid, point_count, last_indexed_at \
             FROM dataset_collections WHERE dataset_id = $1",
        )
        .bind(dataset_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(Self::row_to_collection))
    }

    async fn insert_indexed_files(&self, rows: &[IndexedFile]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "INSERT INTO indexed_files \
                 (project_id, dataset_id, relative_path, content_hash, file_size, chunk_count, last_indexed_at, language) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (project_id, dataset_id, relative_path) DO UPDATE SET \
                   content_hash = excluded.content_hash, \
                   file_size = excluded.file_size, \
                   chunk_count = excluded.chunk_count, \
                   last_indexed_at = excluded.last_indexed_at, \
                   language = excluded.language",
            )
            .bind(row.project_id)
            .bind(row.dataset_id)
            .bind(&row.relative_path)
            .bind(&row.content_hash)
            .bind(row.file_size as i64)
            .bind(row.chunk_count as i32)
            .bind(row.last_indexed_at)
            .bind(&row.language)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_indexed_file(&self, project_id: Uuid, dataset_id: Uuid, relative_path: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM indexed_files WHERE project_id = $1 AND dataset_id = $2 AND relative_path = $3")
            .bind(project_id)
            .bind(dataset_id)
            .bind(relative_path)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_indexed_files(&self, project_id: Uuid, dataset_id: Uuid) -> Result<Vec<IndexedFile>, StorageError> {
        let rows = sqlx::query("SELECT * FROM indexed_files WHERE project_id = $1 AND dataset_id = $2")
            .bind(project_id)
            .bind(dataset_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::row_to_indexed_file).collect())
    }

    async fn count_indexed_files(&self, project_id: Uuid, dataset_id: Uuid) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM indexed_files WHERE project_id = $1 AND dataset_id = $2")
            .bind(project_id)
            .bind(dataset_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn clear_dataset(&self, dataset_id: Uuid) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM indexed_files WHERE dataset_id = $1").bind(dataset_id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM dataset_collections WHERE dataset_id = $1").bind(dataset_id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM datasets WHERE id = $1").bind(dataset_id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Advisory timestamp helper used by callers constructing `IndexedFile`
/// rows outside of a database round-trip (kept here so callers don't
/// need a direct `chrono` dependency just for this).
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
