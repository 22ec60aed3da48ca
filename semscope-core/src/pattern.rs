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

//! Dataset Pattern Resolver (C2, §4.2).
//!
//! Expands a user dataset selector (single name, array, wildcard, glob,
//! or semantic alias) into a concrete, order-preserving, deduplicated
//! subset of the caller's `available` dataset names. Never memoizes
//! across calls — `available` changes between callers (Design Notes §9).

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `selector ∈ None | string | string[]` from the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetSelector {
    Single(String),
    Many(Vec<String>),
}

impl DatasetSelector {
    fn tokens(&self) -> Vec<String> {
        match self {
            DatasetSelector::Single(s) => vec![s.clone()],
            DatasetSelector::Many(v) => v.clone(),
        }
    }
}

/// Returned when resolution produces an empty set, so the caller can
/// format a helpful message (§4.2 "Diagnostics").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionDiagnostics {
    pub reason: String,
    pub did_you_mean_aliases: Vec<String>,
    pub examples: Vec<String>,
}

const ALIAS_KEYS: &[&str] = &[
    "env:dev",
    "env:prod",
    "env:test",
    "env:staging",
    "src:code",
    "src:docs",
    "src:api",
    "src:web",
    "src:db",
    "src:external",
    "ver:latest",
    "ver:stable",
    "ver:unstable",
    "branch:main",
    "branch:feature",
    "branch:hotfix",
    "branch:release",
];

/// Closed set of semantic alias expansions (§4.2), carried verbatim.
fn alias_glob_patterns(alias: &str) -> Option<&'static [&'static str]> {
    Some(match alias {
        "env:dev" => &["*-dev", "*-development", "*-staging", "dev-*", "development-*", "staging-*"],
        "env:prod" => &["*-prod", "*-production", "*-live", "prod-*", "production-*", "live-*"],
        "env:test" => &["*-test", "*-testing", "*-qa", "test-*", "testing-*", "qa-*"],
        "env:staging" => &["*-staging", "*-stage", "staging-*", "stage-*"],
        "src:code" => &["local", "github-*", "gitlab-*", "bitbucket-*"],
        "src:docs" => &["docs", "documentation", "*-docs", "wiki", "*-wiki", "readme", "*-readme"],
        "src:api" => &["api-*", "*-api", "api-docs", "api-ref", "swagger", "openapi"],
        "src:web" => &["crawl-*", "web-*", "*-crawl", "*-web", "site-*"],
        "src:db" => &["db-*", "*-db", "database-*", "*-database", "sql-*"],
        "src:external" => &["external-*", "third-party-*", "vendor-*", "integration-*"],
        "branch:main" => &["*-main", "*-master", "main-*", "master-*", "main", "master"],
        "branch:feature" => &["*-feature-*", "feature-*", "*-feat-*", "feat-*"],
        "branch:hotfix" => &["*-hotfix-*", "hotfix-*", "*-patch-*", "patch-*"],
        "branch:release" => &["*-release-*", "release-*", "*-rel-*", "rel-*"],
        _ => return None,
    })
}

const UNSTABLE_MARKERS: &[&str] = &["alpha", "beta", "rc", "dev"];

fn is_stable(name: &str) -> bool {
    let lower = name.to_lowercase();
    !UNSTABLE_MARKERS.iter().any(|m| lower.contains(m))
}

/// `ver:latest`: for each dataset family (name with its trailing
/// `-vN[.M[.P]][-qualifier]` stripped) keep the lexicographically
/// highest stable member. Names with no recognizable version suffix do
/// not belong to any family and are not candidates. Ordering is
/// lexical on the captured suffix, not semver-aware — see
/// SPEC_FULL.md §13 open question 2.
fn ver_latest(available: &[String]) -> Vec<String> {
    static VERSION_SUFFIX: &str = r"^(.+)-v([0-9][0-9A-Za-z.\-]*)$";
    let re = Regex::new(VERSION_SUFFIX).expect("valid regex");

    let mut families: Vec<(String, Vec<(String, String)>)> = Vec::new();
    for name in available {
        let Some(caps) = re.captures(name) else {
            continue;
        };
        let family = caps[1].to_string();
        let suffix = caps[2].to_string();
        match families.iter_mut().find(|(f, _)| *f == family) {
            Some((_, members)) => members.push((suffix, name.clone())),
            None => families.push((family, vec![(suffix, name.clone())])),
        }
    }

    let mut result = Vec::new();
    for (_, members) in families {
        let best = members
            .into_iter()
            .filter(|(_, name)| is_stable(name))
            .max_by(|(a, _), (b, _)| a.cmp(b));
        if let Some((_, name)) = best {
            result.push(name);
        }
    }
    result
}

fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                out.push('[');
                for c2 in chars.by_ref() {
                    out.push(c2);
                    if c2 == ']' {
                        break;
                    }
                }
            }
            c if ".+()|^$\\{}".contains(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('$');
    Regex::new(&out).ok()
}

fn is_glob(token: &str) -> bool {
    token.contains('*') || token.contains('?') || token.contains('[')
}

/// Matches `pattern` against `available`, preserving `available`'s order.
fn glob_match<'a>(pattern: &str, available: &'a [String]) -> Vec<&'a String> {
    match glob_to_regex(pattern) {
        Some(re) => available.iter().filter(|name| re.is_match(name)).collect(),
        None => Vec::new(),
    }
}

/// Dataset Pattern Resolver (C2).
pub struct DatasetPatternResolver;

impl DatasetPatternResolver {
    /// Resolves `selector` against `available`. Guarantees (§8 property
    /// 5): output is a subset of `available`; `"*"` returns `available`
    /// exactly; order follows first appearance across the selector's
    /// tokens (ties within a token follow `available`'s order);
    /// duplicates are dropped, keeping the first occurrence.
    pub fn resolve(
        selector: Option<&DatasetSelector>,
        available: &[String],
    ) -> (Vec<String>, Option<ResolutionDiagnostics>) {
        let tokens = selector.map(DatasetSelector::tokens).unwrap_or_default();

        if tokens.is_empty() {
            return (available.to_vec(), None);
        }

        let mut result: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for token in &tokens {
            if token == "*" {
                return (available.to_vec(), None);
            }

            let matched: Vec<String> = if let Some(patterns) = alias_glob_patterns(token) {
                let mut names = Vec::new();
                for pattern in patterns {
                    for m in glob_match(pattern, available) {
                        if !names.contains(m) {
                            names.push(m.clone());
                        }
                    }
                }
                names
            } else if token == "ver:latest" {
                ver_latest(available)
            } else if token == "ver:stable" {
                available.iter().filter(|n| is_stable(n)).cloned().collect()
            } else if token == "ver:unstable" {
                available.iter().filter(|n| !is_stable(n)).cloned().collect()
            } else if is_glob(token) {
                glob_match(token, available).into_iter().cloned().collect()
            } else {
                available.iter().filter(|n| *n == token).cloned().collect()
            };

            for name in matched {
                if seen.insert(name.clone()) {
                    result.push(name);
                }
            }
        }

        if result.is_empty() {
            let diagnostics = ResolutionDiagnostics {
                reason: format!("no datasets in the accessible set matched selector {tokens:?}"),
                did_you_mean_aliases: ALIAS_KEYS.iter().map(|s| s.to_string()).collect(),
                examples: available.iter().take(5).cloned().collect(),
            };
            return (result, Some(diagnostics));
        }

        (result, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_selector_returns_available() {
        let available = names(&["a", "b"]);
        let (resolved, diag) = DatasetPatternResolver::resolve(None, &available);
        assert_eq!(resolved, available);
        assert!(diag.is_none());
    }

    #[test]
    fn star_short_circuits() {
        let available = names(&["a", "b", "c"]);
        let selector = DatasetSelector::Many(vec!["env:dev".into(), "*".into()]);
        let (resolved, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(resolved, available);
    }

    #[test]
    fn glob_matches_in_available_order() {
        let available = names(&["github-main", "github-dev", "api-dev"]);
        let selector = DatasetSelector::Single("*-dev".into());
        let (resolved, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(resolved, names(&["github-dev", "api-dev"]));
    }

    #[test]
    fn scenario_s2_from_spec() {
        let available = names(&[
            "local",
            "github-main",
            "github-dev",
            "docs",
            "api-prod",
            "api-dev",
            "app-v1",
            "app-v2",
            "app-v3-rc",
        ]);
        let selector = DatasetSelector::Many(vec!["env:dev".into(), "src:docs".into(), "ver:latest".into()]);
        let (resolved, diag) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(resolved, names(&["github-dev", "api-dev", "docs", "app-v2"]));
        assert!(diag.is_none());
    }

    #[test]
    fn ver_stable_and_unstable_partition_available() {
        let available = names(&["app-v1", "app-v2-beta", "lib-dev", "lib-prod"]);
        let selector = DatasetSelector::Single("ver:stable".into());
        let (stable, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(stable, names(&["app-v1", "lib-prod"]));

        let selector = DatasetSelector::Single("ver:unstable".into());
        let (unstable, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(unstable, names(&["app-v2-beta", "lib-dev"]));
    }

    #[test]
    fn character_range_supported() {
        let available = names(&["release-a", "release-b", "release-9", "release-z"]);
        let selector = DatasetSelector::Single("release-[a-c]".into());
        let (resolved, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(resolved, names(&["release-a", "release-b"]));
    }

    #[test]
    fn exact_match_drops_unknown_tokens() {
        let available = names(&["a", "b"]);
        let selector = DatasetSelector::Many(vec!["a".into(), "nonexistent".into()]);
        let (resolved, diag) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(resolved, names(&["a"]));
        assert!(diag.is_none());
    }

    #[test]
    fn empty_result_produces_diagnostics() {
        let available = names(&["a", "b", "c", "d", "e", "f"]);
        let selector = DatasetSelector::Single("nonexistent-*".into());
        let (resolved, diag) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert!(resolved.is_empty());
        let diag = diag.expect("diagnostics expected");
        assert_eq!(diag.examples.len(), 5);
        assert!(diag.did_you_mean_aliases.contains(&"env:dev".to_string()));
    }

    #[test]
    fn result_is_always_subset_of_available() {
        let available = names(&["local", "github-main", "docs", "api-prod", "app-v1", "app-v2"]);
        let selectors = vec![
            DatasetSelector::Single("*".into()),
            DatasetSelector::Single("env:prod".into()),
            DatasetSelector::Many(vec!["src:docs".into(), "ver:latest".into()]),
        ];
        for selector in selectors {
            let (resolved, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
            for name in &resolved {
                assert!(available.contains(name));
            }
        }
    }

    #[test]
    fn resolution_is_idempotent_given_same_available() {
        let available = names(&["github-dev", "api-dev", "docs", "app-v2"]);
        let selector = DatasetSelector::Many(vec!["env:dev".into(), "src:docs".into(), "ver:latest".into()]);
        let (first, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
        let (second, _) = DatasetPatternResolver::resolve(Some(&selector), &available);
        assert_eq!(first, second);
    }
}
