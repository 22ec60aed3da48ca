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

//! Extension/language-hint resolution, shared by the AST and the
//! fenced-code-block splitters.

/// Canonical language name for a file extension, or `None` when the
/// extension isn't one the chunker recognizes at all (still eligible for
/// the character-based fallback, just without a language tag).
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "rs" => Some("rust"),
        "py" | "pyi" => Some("python"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "ts" | "tsx" => Some("typescript"),
        "go" => Some("go"),
        _ => None,
    }
}

/// Whether the `treesitter` feature has a grammar for `language`.
#[cfg(feature = "treesitter")]
pub fn has_ast_support(language: &str) -> bool {
    matches!(language, "rust" | "python" | "javascript" | "typescript" | "go")
}

#[cfg(not(feature = "treesitter"))]
pub fn has_ast_support(_language: &str) -> bool {
    false
}

/// A fenced-code-block's language tag, as found in web page markdown
/// (e.g. ` ```ts `), normalized the same way as a file extension.
pub fn language_for_fence_tag(tag: &str) -> Option<&'static str> {
    match tag.trim().to_ascii_lowercase().as_str() {
        "rust" | "rs" => Some("rust"),
        "python" | "py" => Some("python"),
        "javascript" | "js" => Some("javascript"),
        "typescript" | "ts" | "tsx" => Some("typescript"),
        "go" | "golang" => Some("go"),
        _ => None,
    }
}
