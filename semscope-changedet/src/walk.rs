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

//! Tree walking (§4.4): an allowlist of extensions plus an ignore-pattern
//! set merged from built-in defaults, any `.*ignore` files discovered in
//! the tree, and an optional global ignore file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Build artifacts, VCS metadata, and caches excluded regardless of what
/// the tree's own ignore files say.
const BUILT_IN_IGNORES: &[&str] = &[
    "target", "node_modules", ".git", ".hg", ".svn", "dist", "build", ".cache", "__pycache__",
    ".venv", "venv", ".next", ".turbo", "vendor",
];

#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub root: PathBuf,
    /// Allowed extensions (without the dot); empty means "allow all text files".
    pub extensions: HashSet<String>,
    /// Absolute path to an optional global ignore file (§4.4).
    pub global_ignore: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub size: u64,
}

/// Walks `config.root`, applying the built-in ignore defaults, any
/// `.*ignore` files found in the tree (`.gitignore`, `.ignore`, ...), and
/// the optional global ignore, then filters by extension allowlist.
pub fn walk_candidates(config: &WalkConfig) -> Vec<CandidateFile> {
    let mut builder = WalkBuilder::new(&config.root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .parents(true);

    if let Some(global) = &config.global_ignore {
        builder.add_ignore(global);
    }

    let built_in: HashSet<&'static str> = BUILT_IN_IGNORES.iter().copied().collect();
    builder.filter_entry(move |entry| {
        entry
            .file_name()
            .to_str()
            .map(|name| !built_in.contains(name))
            .unwrap_or(true)
    });

    let mut candidates = Vec::new();
    for result in builder.build() {
        let Ok(entry) = result else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let abs_path = entry.path().to_path_buf();
        if !config.extensions.is_empty() {
            let ext = abs_path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !config.extensions.contains(ext) {
                continue;
            }
        }

        let relative_path = relative_slash_path(&config.root, &abs_path);
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        candidates.push(CandidateFile {
            relative_path,
            absolute_path: abs_path,
            size,
        });
    }

    candidates
}

fn relative_slash_path(root: &Path, abs_path: &Path) -> String {
    abs_path
        .strip_prefix(root)
        .unwrap_or(abs_path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_files_and_respects_extension_allowlist() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("b.md"), "# hi").unwrap();

        let config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: ["rs".to_string()].into_iter().collect(),
            global_ignore: None,
        };
        let candidates = walk_candidates(&config);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].relative_path, "a.rs");
    }

    #[test]
    fn built_in_ignores_skip_target_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/out.rs"), "fn x() {}").unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();

        let config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: HashSet::new(),
            global_ignore: None,
        };
        let candidates = walk_candidates(&config);
        assert!(candidates.iter().all(|c| !c.relative_path.starts_with("target/")));
        assert!(candidates.iter().any(|c| c.relative_path == "main.rs"));
    }

    #[test]
    fn gitignore_file_in_tree_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "secret.rs\n").unwrap();
        fs::write(dir.path().join("secret.rs"), "fn s() {}").unwrap();
        fs::write(dir.path().join("public.rs"), "fn p() {}").unwrap();

        let config = WalkConfig {
            root: dir.path().to_path_buf(),
            extensions: HashSet::new(),
            global_ignore: None,
        };
        let candidates = walk_candidates(&config);
        assert!(!candidates.iter().any(|c| c.relative_path == "secret.rs"));
        assert!(candidates.iter().any(|c| c.relative_path == "public.rs"));
    }
}
