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

//! Classification of walked candidates against previously indexed files
//! (§4.4), and the `checkIndex` recommendation derived from the result.

use std::collections::HashMap;
use std::fs;

use semscope_core::model::content_hash;
use semscope_core::IndexedFile;

use crate::walk::CandidateFile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeStats {
    pub new_count: usize,
    pub modified_count: usize,
    pub deleted_count: usize,
    pub unchanged_count: usize,
}

impl ChangeStats {
    pub fn total_considered(&self) -> usize {
        self.new_count + self.modified_count + self.deleted_count + self.unchanged_count
    }

    pub fn changed_count(&self) -> usize {
        self.new_count + self.modified_count + self.deleted_count
    }

    pub fn unchanged_ratio(&self) -> f64 {
        let total = self.total_considered();
        if total == 0 {
            1.0
        } else {
            self.unchanged_count as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub new: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: Vec<String>,
    pub stats: ChangeStats,
}

/// Recommendation returned to `checkIndex` callers (§4.4, §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRecommendation {
    Skip,
    Incremental,
    FullReindex,
}

/// Compares walked `candidates` against the `indexed` rows for the same
/// dataset, reading each candidate's bytes to compute its content hash.
/// Files that fail to read are dropped from consideration entirely
/// (neither new, modified, nor unchanged) rather than misclassified.
pub fn detect_changes(candidates: &[CandidateFile], indexed: &[IndexedFile]) -> ChangeSet {
    let indexed_by_path: HashMap<&str, &IndexedFile> =
        indexed.iter().map(|f| (f.relative_path.as_str(), f)).collect();
    let mut seen = std::collections::HashSet::new();

    let mut set = ChangeSet::default();

    for candidate in candidates {
        let Ok(bytes) = fs::read(&candidate.absolute_path) else {
            continue;
        };
        let hash = content_hash(&bytes);
        seen.insert(candidate.relative_path.as_str());

        match indexed_by_path.get(candidate.relative_path.as_str()) {
            None => {
                set.new.push(candidate.relative_path.clone());
                set.stats.new_count += 1;
            }
            Some(row) if row.content_hash != hash => {
                set.modified.push(candidate.relative_path.clone());
                set.stats.modified_count += 1;
            }
            Some(_) => {
                set.unchanged.push(candidate.relative_path.clone());
                set.stats.unchanged_count += 1;
            }
        }
    }

    for row in indexed {
        if !seen.contains(row.relative_path.as_str()) {
            set.deleted.push(row.relative_path.clone());
            set.stats.deleted_count += 1;
        }
    }

    set
}

/// `skip` when nothing changed, `incremental` when >70% unchanged and
/// <50 files changed, `full-reindex` otherwise (§4.4).
pub fn recommend(stats: &ChangeStats) -> IndexRecommendation {
    if stats.changed_count() == 0 {
        return IndexRecommendation::Skip;
    }
    if stats.unchanged_ratio() > 0.70 && stats.changed_count() < 50 {
        return IndexRecommendation::Incremental;
    }
    IndexRecommendation::FullReindex
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use uuid::Uuid;

    fn indexed_row(path: &str, hash: &str) -> IndexedFile {
        IndexedFile {
            project_id: Uuid::new_v4(),
            dataset_id: Uuid::new_v4(),
            relative_path: path.to_string(),
            content_hash: hash.to_string(),
            file_size: 0,
            chunk_count: 0,
            last_indexed_at: Utc::now(),
            language: None,
        }
    }

    #[test]
    fn classifies_new_modified_unchanged_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("new.rs"), "fn a() {}").unwrap();
        fs::write(dir.path().join("changed.rs"), "fn b() { 2 }").unwrap();
        fs::write(dir.path().join("same.rs"), "fn c() {}").unwrap();

        let candidates = vec![
            CandidateFile {
                relative_path: "new.rs".into(),
                absolute_path: dir.path().join("new.rs"),
                size: 0,
            },
            CandidateFile {
                relative_path: "changed.rs".into(),
                absolute_path: dir.path().join("changed.rs"),
                size: 0,
            },
            CandidateFile {
                relative_path: "same.rs".into(),
                absolute_path: dir.path().join("same.rs"),
                size: 0,
            },
        ];

        let same_hash = content_hash(b"fn c() {}");
        let indexed = vec![
            indexed_row("changed.rs", "stale-hash"),
            indexed_row("same.rs", &same_hash),
            indexed_row("gone.rs", "whatever"),
        ];

        let set = detect_changes(&candidates, &indexed);
        assert_eq!(set.new, vec!["new.rs".to_string()]);
        assert_eq!(set.modified, vec!["changed.rs".to_string()]);
        assert_eq!(set.unchanged, vec!["same.rs".to_string()]);
        assert_eq!(set.deleted, vec!["gone.rs".to_string()]);
    }

    #[test]
    fn recommendation_thresholds() {
        let skip = ChangeStats {
            unchanged_count: 100,
            ..Default::default()
        };
        assert_eq!(recommend(&skip), IndexRecommendation::Skip);

        let incremental = ChangeStats {
            unchanged_count: 80,
            modified_count: 10,
            ..Default::default()
        };
        assert_eq!(recommend(&incremental), IndexRecommendation::Incremental);

        let full = ChangeStats {
            unchanged_count: 10,
            new_count: 60,
            ..Default::default()
        };
        assert_eq!(recommend(&full), IndexRecommendation::FullReindex);

        let boundary_too_many_changed = ChangeStats {
            unchanged_count: 200,
            modified_count: 50,
            ..Default::default()
        };
        assert_eq!(recommend(&boundary_too_many_changed), IndexRecommendation::FullReindex);
    }
}
