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

//! AST-aware splitting (§4.3): one chunk per top-level symbol, with the
//! code between symbols (imports, module docstrings, stray statements)
//! falling back to the character splitter so no source byte is dropped.

use semscope_core::Symbol;
use tree_sitter::{Language, Node, Parser};

use crate::charsplit::split_by_chars;
use crate::ChunkDraft;

fn ts_language(language: &str) -> Option<Language> {
    match language {
        "rust" => Some(tree_sitter_rust::LANGUAGE.into()),
        "python" => Some(tree_sitter_python::LANGUAGE.into()),
        "javascript" => Some(tree_sitter_javascript::LANGUAGE.into()),
        "typescript" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "go" => Some(tree_sitter_go::LANGUAGE.into()),
        _ => None,
    }
}

/// Maps a tree-sitter top-level node kind to our symbol label. Returns
/// `None` for nodes that aren't chunk-worthy symbols (the node is then
/// treated as ordinary code and folded into a surrounding gap span).
fn classify_node(kind: &str) -> Option<&'static str> {
    match kind {
        "function_item" | "function_declaration" | "function_definition" => Some("function"),
        "struct_item" | "struct_specifier" => Some("struct"),
        "enum_item" | "enum_declaration" | "enum_specifier" => Some("enum"),
        "trait_item" => Some("trait"),
        "impl_item" => Some("impl"),
        "type_item" | "type_alias_declaration" => Some("type"),
        "const_item" | "static_item" => Some("const"),
        "class_declaration" | "class_definition" => Some("class"),
        "interface_declaration" => Some("interface"),
        "method_declaration" => Some("method"),
        _ => None,
    }
}

fn extract_name(node: &Node, source: &[u8]) -> Option<String> {
    if let Some(name_node) = node.child_by_field_name("name") {
        if let Ok(text) = name_node.utf8_text(source) {
            let name = text.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    if node.kind() == "impl_item" {
        if let Some(type_node) = node.child_by_field_name("type") {
            if let Ok(text) = type_node.utf8_text(source) {
                return Some(text.trim().to_string());
            }
        }
    }
    None
}

struct TopLevelSymbol {
    name: String,
    kind: &'static str,
    start_line: u32,
    end_line: u32,
}

fn top_level_symbols(root: &Node, source: &[u8]) -> Vec<TopLevelSymbol> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        // `export function foo() {}` wraps the real node one level down.
        let effective = if child.kind() == "export_statement" {
            child.named_child(0).unwrap_or(child)
        } else {
            child
        };
        if let Some(kind) = classify_node(effective.kind()) {
            let name = extract_name(&effective, source).unwrap_or_else(|| "<anonymous>".to_string());
            out.push(TopLevelSymbol {
                name,
                kind,
                start_line: child.start_position().row as u32 + 1,
                end_line: child.end_position().row as u32 + 1,
            });
        }
    }
    out.sort_by_key(|s| s.start_line);
    out
}

/// Splits `content` along top-level symbol boundaries. Returns `None`
/// when `language` has no grammar registered or parsing fails outright,
/// signaling the caller to fall back to [`split_by_chars`] over the
/// whole file.
pub fn split_by_ast(
    content: &str,
    language: &str,
    relative_path: &str,
    char_target: usize,
    char_overlap: usize,
) -> Option<Vec<ChunkDraft>> {
    let lang = ts_language(language)?;
    let mut parser = Parser::new();
    parser.set_language(&lang).ok()?;
    let tree = parser.parse(content, None)?;
    let source = content.as_bytes();
    let symbols = top_level_symbols(&tree.root_node(), source);

    if symbols.is_empty() {
        return None;
    }

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let total_lines = lines.len() as u32;
    let slice = |start: u32, end: u32| -> String {
        let lo = (start.saturating_sub(1)) as usize;
        let hi = (end as usize).min(lines.len());
        if lo >= hi {
            String::new()
        } else {
            lines[lo..hi].concat()
        }
    };

    let mut drafts = Vec::new();
    let mut chunk_index = 0u32;
    let mut cursor_line = 1u32;

    let mut push_gap = |from: u32, to: u32, drafts: &mut Vec<ChunkDraft>, chunk_index: &mut u32| {
        if from > to {
            return;
        }
        let gap_text = slice(from, to);
        if gap_text.trim().is_empty() {
            return;
        }
        for (text, rel_start, rel_end) in split_by_chars(&gap_text, char_target, char_overlap) {
            drafts.push(ChunkDraft {
                relative_path: relative_path.to_string(),
                start_line: from + rel_start - 1,
                end_line: from + rel_end - 1,
                chunk_index: *chunk_index,
                content: text,
                language: Some(language.to_string()),
                symbol: None,
            });
            *chunk_index += 1;
        }
    };

    for symbol in &symbols {
        push_gap(cursor_line, symbol.start_line.saturating_sub(1), &mut drafts, &mut chunk_index);
        drafts.push(ChunkDraft {
            relative_path: relative_path.to_string(),
            start_line: symbol.start_line,
            end_line: symbol.end_line,
            chunk_index,
            content: slice(symbol.start_line, symbol.end_line),
            language: Some(language.to_string()),
            symbol: Some(Symbol {
                name: symbol.name.clone(),
                kind: symbol.kind.to_string(),
            }),
        });
        chunk_index += 1;
        cursor_line = symbol.end_line + 1;
    }
    push_gap(cursor_line, total_lines, &mut drafts, &mut chunk_index);

    drafts.sort_by_key(|d| d.start_line);
    for (i, d) in drafts.iter_mut().enumerate() {
        d.chunk_index = i as u32;
    }

    Some(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_top_level_items_become_chunks() {
        let src = "use std::fmt;\n\nfn greet() {\n    println!(\"hi\");\n}\n\nstruct Config {\n    name: String,\n}\n";
        let drafts = split_by_ast(src, "rust", "lib.rs", 1000, 100).expect("ast split");
        let named: Vec<&str> = drafts
            .iter()
            .filter_map(|d| d.symbol.as_ref().map(|s| s.name.as_str()))
            .collect();
        assert!(named.contains(&"greet"));
        assert!(named.contains(&"Config"));
    }

    #[test]
    fn chunk_indices_are_sequential_from_zero() {
        let src = "fn a() {}\nfn b() {}\n";
        let drafts = split_by_ast(src, "rust", "lib.rs", 1000, 100).expect("ast split");
        for (i, d) in drafts.iter().enumerate() {
            assert_eq!(d.chunk_index, i as u32);
        }
    }

    #[test]
    fn unsupported_language_returns_none() {
        assert!(split_by_ast("print('hi')", "lua", "x.lua", 1000, 100).is_none());
    }

    #[test]
    fn line_ranges_cover_the_whole_file_without_gaps() {
        let src = "// header\nfn a() {\n    1;\n}\n\nfn b() {\n    2;\n}\n// trailer\n";
        let drafts = split_by_ast(src, "rust", "lib.rs", 1000, 100).expect("ast split");
        assert_eq!(drafts.first().unwrap().start_line, 1);
        assert_eq!(drafts.last().unwrap().end_line, src.lines().count() as u32);
    }
}
