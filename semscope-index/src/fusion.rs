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

//! Client-side fusion of a dense and a sparse result list into one
//! ranked list (§4.6 `hybrid_query`). Qdrant is queried once per named
//! vector (`dense`, `sparse`) rather than relying on a server-side
//! fusion stage, so the gateway controls the weighting the way §6's
//! configuration knobs describe.

use std::collections::HashMap;

use crate::model::SearchHit;

#[derive(Debug, Clone, Copy)]
pub enum FusionMethod {
    WeightedSum { dense_weight: f32, sparse_weight: f32 },
    ReciprocalRank { k: f32 },
}

/// Merges `dense` and `sparse` hit lists by document id. A document
/// present in only one list still appears in the output with the other
/// component treated as absent (not zero-scored) for provenance, but
/// contributes only its own term to the fused score.
pub fn fuse(dense: &[SearchHit], sparse: &[SearchHit], method: FusionMethod) -> Vec<SearchHit> {
    match method {
        FusionMethod::WeightedSum { dense_weight, sparse_weight } => {
            weighted_sum(dense, sparse, dense_weight, sparse_weight)
        }
        FusionMethod::ReciprocalRank { k } => reciprocal_rank(dense, sparse, k),
    }
}

fn weighted_sum(dense: &[SearchHit], sparse: &[SearchHit], dense_weight: f32, sparse_weight: f32) -> Vec<SearchHit> {
    let mut merged: HashMap<String, SearchHit> = HashMap::new();

    for hit in dense {
        merged.insert(
            hit.id.clone(),
            SearchHit {
                id: hit.id.clone(),
                score: hit.score * dense_weight,
                sparse_score: None,
                payload: hit.payload.clone(),
            },
        );
    }

    for hit in sparse {
        merged
            .entry(hit.id.clone())
            .and_modify(|existing| {
                existing.sparse_score = Some(hit.score);
                existing.score += hit.score * sparse_weight;
            })
            .or_insert_with(|| SearchHit {
                id: hit.id.clone(),
                score: hit.score * sparse_weight,
                sparse_score: Some(hit.score),
                payload: hit.payload.clone(),
            });
    }

    let mut results: Vec<SearchHit> = merged.into_values().collect();
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results
}

fn reciprocal_rank(dense: &[SearchHit], sparse: &[SearchHit], k: f32) -> Vec<SearchHit> {
    let mut merged: HashMap<String, SearchHit> = HashMap::new();

    for (rank, hit) in dense.iter().enumerate() {
        merged.insert(
            hit.id.clone(),
            SearchHit {
                id: hit.id.clone(),
                score: 1.0 / (k + rank as f32 + 1.0),
                sparse_score: None,
                payload: hit.payload.clone(),
            },
        );
    }

    for (rank, hit) in sparse.iter().enumerate() {
        let contribution = 1.0 / (k + rank as f32 + 1.0);
        merged
            .entry(hit.id.clone())
            .and_modify(|existing| {
                existing.sparse_score = Some(hit.score);
                existing.score += contribution;
            })
            .or_insert_with(|| SearchHit {
                id: hit.id.clone(),
                score: contribution,
                sparse_score: Some(hit.score),
                payload: hit.payload.clone(),
            });
    }

    let mut results: Vec<SearchHit> = merged.into_values().collect();
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn hit(id: &str, score: f32) -> SearchHit {
        SearchHit { id: id.to_string(), score, sparse_score: None, payload: Map::new() }
    }

    #[test]
    fn weighted_sum_combines_overlapping_documents() {
        let dense = vec![hit("a", 0.9), hit("b", 0.5)];
        let sparse = vec![hit("a", 0.4), hit("c", 0.8)];
        let fused = fuse(&dense, &sparse, FusionMethod::WeightedSum { dense_weight: 0.6, sparse_weight: 0.4 });
        let a = fused.iter().find(|h| h.id == "a").unwrap();
        assert!((a.score - (0.9 * 0.6 + 0.4 * 0.4)).abs() < 1e-6);
        assert_eq!(a.sparse_score, Some(0.4));
        assert_eq!(fused.len(), 3);
    }

    #[test]
    fn weighted_sum_orders_descending_by_fused_score() {
        let dense = vec![hit("a", 0.1), hit("b", 0.9)];
        let sparse = vec![];
        let fused = fuse(&dense, &sparse, FusionMethod::WeightedSum { dense_weight: 1.0, sparse_weight: 0.0 });
        assert_eq!(fused[0].id, "b");
        assert_eq!(fused[1].id, "a");
    }

    #[test]
    fn reciprocal_rank_rewards_top_ranked_items_from_either_list() {
        let dense = vec![hit("a", 0.99), hit("b", 0.98)];
        let sparse = vec![hit("b", 10.0), hit("a", 1.0)];
        let fused = fuse(&dense, &sparse, FusionMethod::ReciprocalRank { k: 60.0 });
        assert_eq!(fused[0].id, "a");
    }
}
