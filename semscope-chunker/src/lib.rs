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

//! Chunker (C3, §4.3).
//!
//! Given raw bytes, a language hint, and a relative path, produces an
//! ordered list of [`ChunkDraft`]s. Code takes the AST-aware path when a
//! grammar is available and falls back to the character splitter
//! otherwise; web pages split fenced code from prose first and feed each
//! half through whichever splitter fits.

#[cfg(feature = "treesitter")]
mod ast;
mod charsplit;
mod error;
mod language;
mod webpage;

pub use error::ChunkerError;
pub use language::language_for_extension;

use semscope_core::config::ChunkerConfig;
use semscope_core::{sanitize_utf16, Symbol};

/// A chunk before it has been assigned an id or attached to a project
/// and dataset — those are filled in by the Ingestion Orchestrator,
/// which is the only component that knows them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub relative_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub chunk_index: u32,
    pub content: String,
    pub language: Option<String>,
    pub symbol: Option<Symbol>,
}

/// Replaces unpaired UTF-16 surrogates before a chunk's content is
/// hashed or embedded (§4.3). `content` is assumed to already be valid
/// `&str`; this exists for callers that decoded from a source (e.g. a
/// crawler) that preserved raw UTF-16 code units.
pub fn sanitize_content(units: &[u16]) -> String {
    sanitize_utf16(units)
}

fn warn_if_over_soft_cap(relative_path: &str, chunk_count: usize, byte_size: usize, cfg: &ChunkerConfig) {
    if chunk_count > cfg.soft_chunk_warning || byte_size as u64 > cfg.soft_size_warning_bytes {
        tracing::warn!(
            path = relative_path,
            chunks = chunk_count,
            bytes = byte_size,
            "file exceeds soft chunking thresholds"
        );
    }
}

/// Chunks a source code file. `language_hint` overrides the extension
/// derived from `relative_path` when provided.
pub fn chunk_code(
    content: &str,
    relative_path: &str,
    language_hint: Option<&str>,
    cfg: &ChunkerConfig,
) -> Result<Vec<ChunkDraft>, ChunkerError> {
    if content.is_empty() {
        return Err(ChunkerError::EmptyInput {
            path: relative_path.to_string(),
        });
    }

    let ext = relative_path.rsplit('.').next().unwrap_or_default();
    let language = language_hint
        .map(|s| s.to_string())
        .or_else(|| language::language_for_extension(ext).map(|s| s.to_string()));

    let drafts = match &language {
        #[cfg(feature = "treesitter")]
        Some(lang) if language::has_ast_support(lang) => {
            ast::split_by_ast(content, lang, relative_path, cfg.char_target, cfg.char_overlap)
                .unwrap_or_else(|| char_drafts(content, relative_path, language.clone(), cfg))
        }
        _ => char_drafts(content, relative_path, language.clone(), cfg),
    };

    warn_if_over_soft_cap(relative_path, drafts.len(), content.len(), cfg);
    Ok(drafts)
}

fn char_drafts(content: &str, relative_path: &str, language: Option<String>, cfg: &ChunkerConfig) -> Vec<ChunkDraft> {
    charsplit::split_by_chars(content, cfg.char_target, cfg.char_overlap)
        .into_iter()
        .enumerate()
        .map(|(idx, (text, start, end))| ChunkDraft {
            relative_path: relative_path.to_string(),
            start_line: start,
            end_line: end,
            chunk_index: idx as u32,
            content: text,
            language: language.clone(),
            symbol: None,
        })
        .collect()
}

/// Chunks a web page body: fenced code blocks go through the AST-aware
/// splitter under their fence-tagged language, prose goes through the
/// paragraph/character splitter (§4.3).
pub fn chunk_web_page(content: &str, relative_path: &str, cfg: &ChunkerConfig) -> Result<Vec<ChunkDraft>, ChunkerError> {
    if content.is_empty() {
        return Err(ChunkerError::EmptyInput {
            path: relative_path.to_string(),
        });
    }

    let mut drafts = Vec::new();
    let mut chunk_index = 0u32;

    for segment in webpage::split_segments(content) {
        match segment {
            webpage::WebSegment::Code {
                language,
                content: code,
                start_line,
                ..
            } => {
                let sub = match &language {
                    #[cfg(feature = "treesitter")]
                    Some(lang) if language::has_ast_support(lang) => {
                        ast::split_by_ast(&code, lang, relative_path, cfg.char_target, cfg.char_overlap)
                            .unwrap_or_else(|| char_drafts(&code, relative_path, language.clone(), cfg))
                    }
                    _ => char_drafts(&code, relative_path, language.clone(), cfg),
                };
                for mut d in sub {
                    d.start_line += start_line - 1;
                    d.end_line += start_line - 1;
                    d.chunk_index = chunk_index;
                    chunk_index += 1;
                    drafts.push(d);
                }
            }
            webpage::WebSegment::Prose {
                content: prose,
                start_line,
                ..
            } => {
                if prose.trim().is_empty() {
                    continue;
                }
                for (text, rel_start, rel_end) in charsplit::split_by_chars(&prose, cfg.char_target, cfg.char_overlap)
                {
                    drafts.push(ChunkDraft {
                        relative_path: relative_path.to_string(),
                        start_line: start_line + rel_start - 1,
                        end_line: start_line + rel_end - 1,
                        chunk_index,
                        content: text,
                        language: None,
                        symbol: None,
                    });
                    chunk_index += 1;
                }
            }
        }
    }

    warn_if_over_soft_cap(relative_path, drafts.len(), content.len(), cfg);
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_is_rejected() {
        let cfg = ChunkerConfig::default();
        assert!(chunk_code("", "a.rs", None, &cfg).is_err());
        assert!(chunk_web_page("", "a.md", &cfg).is_err());
    }

    #[test]
    fn unsupported_extension_falls_back_to_char_split() {
        let cfg = ChunkerConfig::default();
        let content = "some plain text content\nwith a few lines\n";
        let drafts = chunk_code(content, "notes.txt", None, &cfg).expect("chunks");
        assert!(!drafts.is_empty());
        assert!(drafts[0].symbol.is_none());
    }

    #[test]
    fn rust_code_produces_symbol_chunks() {
        let cfg = ChunkerConfig::default();
        let content = "fn greet() {\n    println!(\"hi\");\n}\n";
        let drafts = chunk_code(content, "lib.rs", None, &cfg).expect("chunks");
        assert!(drafts.iter().any(|d| d.symbol.is_some()));
    }

    #[test]
    fn language_hint_overrides_extension() {
        let cfg = ChunkerConfig::default();
        let content = "fn greet() {}\n";
        let drafts = chunk_code(content, "snippet.txt", Some("rust"), &cfg).expect("chunks");
        assert!(drafts.iter().any(|d| d.language.as_deref() == Some("rust")));
    }

    #[test]
    fn web_page_separates_code_and_prose_chunks() {
        let cfg = ChunkerConfig::default();
        let content = "# Title\n\nSome intro prose.\n\n```rust\nfn a() {}\n```\n\nMore prose.\n";
        let drafts = chunk_web_page(content, "page.md", &cfg).expect("chunks");
        assert!(drafts.iter().any(|d| d.language.as_deref() == Some("rust")));
        assert!(drafts.iter().any(|d| d.language.is_none()));
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let cfg = ChunkerConfig::default();
        let content = "# T\n\nprose one\n\n```rust\nfn a() {}\n```\n\nprose two\n";
        let drafts = chunk_web_page(content, "page.md", &cfg).expect("chunks");
        for (i, d) in drafts.iter().enumerate() {
            assert_eq!(d.chunk_index, i as u32);
        }
    }
}
