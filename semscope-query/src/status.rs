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

//! Index-Status Service (C10, §4.10): tells a caller whether a codebase
//! path is indexed for a given project/dataset, and if not, what kind of
//! reindex C4's thresholds recommend.

use semscope_changedet::{detect_changes, recommend, walk_candidates, WalkConfig};
use semscope_storage::RelationalStore;

use crate::error::QueryError;
use crate::model::{IndexStatusDetails, IndexStatusRequest, IndexStatusResponse, IndexStatusStats};

const DETAIL_LIMIT: usize = 10;

/// Runs C4 against the live tree and the previously-indexed rows for
/// `(project_id, dataset_id)`, classifying per the same thresholds
/// `semscope_changedet::recommend` uses for ingestion.
pub async fn check_index<St: RelationalStore>(
    store: &St,
    walk_config: &WalkConfig,
    req: &IndexStatusRequest,
) -> Result<IndexStatusResponse, QueryError> {
    let indexed = store
        .get_indexed_files(req.project_id, req.dataset_id)
        .await
        .map_err(|e| QueryError::Storage(e.to_string()))?;

    if indexed.is_empty() {
        return Ok(IndexStatusResponse {
            is_indexed: false,
            is_fully_indexed: false,
            needs_reindex: true,
            stats: IndexStatusStats::default(),
            recommendation: semscope_changedet::IndexRecommendation::FullReindex.into(),
            message: "no files indexed yet for this dataset".to_string(),
            details: None,
        });
    }

    let candidates = walk_candidates(walk_config);
    let change_set = detect_changes(&candidates, &indexed);
    let recommendation = recommend(&change_set.stats);

    let total_files = change_set.stats.total_considered();
    let percent_indexed = if total_files == 0 {
        100.0
    } else {
        (change_set.stats.unchanged_count as f64 / total_files as f64) * 100.0
    };

    let stats = IndexStatusStats {
        total_files,
        indexed_files: indexed.len(),
        unchanged_files: change_set.stats.unchanged_count,
        new_files: change_set.stats.new_count,
        modified_files: change_set.stats.modified_count,
        deleted_files: change_set.stats.deleted_count,
        percent_indexed,
    };

    let needs_reindex = change_set.stats.changed_count() > 0;
    let details = if req.with_details {
        Some(IndexStatusDetails {
            new: change_set.new.iter().take(DETAIL_LIMIT).cloned().collect(),
            modified: change_set.modified.iter().take(DETAIL_LIMIT).cloned().collect(),
            deleted: change_set.deleted.iter().take(DETAIL_LIMIT).cloned().collect(),
        })
    } else {
        None
    };

    let message = match recommendation {
        semscope_changedet::IndexRecommendation::Skip => "index is up to date".to_string(),
        semscope_changedet::IndexRecommendation::Incremental => {
            format!("{} file(s) changed; incremental reindex recommended", change_set.stats.changed_count())
        }
        semscope_changedet::IndexRecommendation::FullReindex => {
            format!("{} file(s) changed; full reindex recommended", change_set.stats.changed_count())
        }
    };

    Ok(IndexStatusResponse {
        is_indexed: true,
        is_fully_indexed: !needs_reindex,
        needs_reindex,
        stats,
        recommendation: recommendation.into(),
        message,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semscope_core::model::IndexedFile;
    use semscope_core::{Collection, Dataset};
    use semscope_storage::StorageError;
    use std::fs;
    use uuid::Uuid;

    struct FakeStorage {
        indexed: Vec<IndexedFile>,
    }

    #[async_trait]
    impl RelationalStore for FakeStorage {
        async fn get_or_create_project(&self, _name: &str) -> Result<Uuid, StorageError> {
            Ok(Uuid::nil())
        }
        async fn get_or_create_dataset(&self, _project_id: Option<Uuid>, _name: &str) -> Result<Uuid, StorageError> {
            Ok(Uuid::nil())
        }
        async fn list_datasets_for_project(&self, _project_id: Uuid) -> Result<Vec<Dataset>, StorageError> {
            Ok(Vec::new())
        }
        async fn list_global_datasets(&self) -> Result<Vec<Dataset>, StorageError> {
            Ok(Vec::new())
        }
        async fn get_or_create_collection_record(
            &self,
            _dataset_id: Uuid,
            _name: &str,
            _backend: &str,
            _dimension: u32,
            _hybrid: bool,
        ) -> Result<Uuid, StorageError> {
            Ok(Uuid::nil())
        }
        async fn update_collection_metadata(&self, _name: &str, _point_count: u64) -> Result<(), StorageError> {
            Ok(())
        }
        async fn resolve_collections_for(&self, _dataset_ids: &[Uuid]) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
        async fn get_collection_by_dataset(&self, _dataset_id: Uuid) -> Result<Option<Collection>, StorageError> {
            Ok(None)
        }
        async fn insert_indexed_files(&self, _rows: &[IndexedFile]) -> Result<(), StorageError> {
            Ok(())
        }
        async fn delete_indexed_file(&self, _project_id: Uuid, _dataset_id: Uuid, _relative_path: &str) -> Result<(), StorageError> {
            Ok(())
        }
        async fn get_indexed_files(&self, _project_id: Uuid, _dataset_id: Uuid) -> Result<Vec<IndexedFile>, StorageError> {
            Ok(self.indexed.clone())
        }
        async fn count_indexed_files(&self, _project_id: Uuid, _dataset_id: Uuid) -> Result<i64, StorageError> {
            Ok(self.indexed.len() as i64)
        }
        async fn clear_dataset(&self, _dataset_id: Uuid) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn no_indexed_rows_reports_not_indexed() {
        let store = FakeStorage { indexed: Vec::new() };
        let dir = tempfile::tempdir().unwrap();
        let walk_config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let req = IndexStatusRequest {
            codebase_path: dir.path().to_path_buf(),
            project_id: Uuid::new_v4(),
            dataset_id: Uuid::new_v4(),
            with_details: false,
        };

        let response = check_index(&store, &walk_config, &req).await.unwrap();
        assert!(!response.is_indexed);
        assert!(response.needs_reindex);
        assert_eq!(response.recommendation, crate::model::IndexRecommendation::FullReindex);
    }

    #[tokio::test]
    async fn unchanged_tree_reports_fully_indexed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), b"fn a() {}").unwrap();
        let content_hash = semscope_core::model::content_hash(b"fn a() {}");

        let project_id = Uuid::new_v4();
        let dataset_id = Uuid::new_v4();
        let indexed = vec![IndexedFile {
            project_id,
            dataset_id,
            relative_path: "a.rs".to_string(),
            content_hash,
            file_size: 9,
            chunk_count: 1,
            last_indexed_at: chrono::Utc::now(),
            language: Some("rust".to_string()),
        }];
        let store = FakeStorage { indexed };
        let walk_config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let req = IndexStatusRequest { codebase_path: dir.path().to_path_buf(), project_id, dataset_id, with_details: true };

        let response = check_index(&store, &walk_config, &req).await.unwrap();
        assert!(response.is_indexed);
        assert!(response.is_fully_indexed);
        assert!(!response.needs_reindex);
        assert_eq!(response.recommendation, crate::model::IndexRecommendation::Skip);
        assert!(response.details.is_some());
    }
}
