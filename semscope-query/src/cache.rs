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

//! Dense query-embedding cache (§4.9 step 3): re-embedding the same
//! query text on every request is wasted work, so the engine keys a
//! bounded moka cache on the normalized query string.

use std::time::Duration;

use moka::sync::Cache;

/// Normalizes a query the same way for every cache lookup/insert so
/// `"Foo Bar"` and `" foo bar "` share an entry.
fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

pub struct QueryEmbeddingCache {
    cache: Cache<String, Vec<f32>>,
}

impl QueryEmbeddingCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build(),
        }
    }

    pub fn get(&self, query: &str) -> Option<Vec<f32>> {
        self.cache.get(&normalize(query))
    }

    pub fn insert(&self, query: &str, embedding: Vec<f32>) {
        self.cache.insert(normalize(query), embedding);
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for QueryEmbeddingCache {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_case_and_whitespace_insensitive() {
        let cache = QueryEmbeddingCache::default();
        cache.insert("Hello World", vec![1.0, 2.0]);
        assert_eq!(cache.get("  hello world  "), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn miss_returns_none() {
        let cache = QueryEmbeddingCache::default();
        assert_eq!(cache.get("nothing here"), None);
    }
}
