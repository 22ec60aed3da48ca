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

//! Web page splitting (§4.3): separates fenced, language-tagged code
//! blocks from prose, feeding each through the splitter that fits it.

use crate::language::language_for_fence_tag;

pub enum WebSegment {
    Code {
        language: Option<String>,
        content: String,
        start_line: u32,
        end_line: u32,
    },
    Prose { content: String, start_line: u32, end_line: u32 },
}

/// Splits a markdown-flavored web page body into alternating code/prose
/// segments, each tagged with its 1-based inclusive line span. An
/// unterminated fence runs to end-of-file and is still reported as code.
pub fn split_segments(content: &str) -> Vec<WebSegment> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut segments = Vec::new();
    let mut i = 0usize;
    let mut prose_start = 0usize;

    while i < lines.len() {
        let trimmed = lines[i].trim_end_matches(['\n', '\r']);
        if let Some(tag) = trimmed.strip_prefix("```") {
            if i > prose_start {
                segments.push(prose_segment(&lines, prose_start, i));
            }

            let code_start = i + 1;
            let mut close = code_start;
            while close < lines.len() && lines[close].trim_end_matches(['\n', '\r']).trim() != "```" {
                close += 1;
            }

            segments.push(WebSegment::Code {
                language: language_for_fence_tag(tag).map(|s| s.to_string()),
                content: lines[code_start..close].concat(),
                start_line: code_start as u32 + 1,
                end_line: close as u32,
            });

            i = (close + 1).min(lines.len());
            if close >= lines.len() {
                // unterminated fence consumed the rest of the file
                i = lines.len();
            }
            prose_start = i;
            continue;
        }
        i += 1;
    }

    if prose_start < lines.len() {
        segments.push(prose_segment(&lines, prose_start, lines.len()));
    }

    segments
}

fn prose_segment(lines: &[&str], from: usize, to: usize) -> WebSegment {
    WebSegment::Prose {
        content: lines[from..to].concat(),
        start_line: from as u32 + 1,
        end_line: to as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_prose_with_no_fences_is_one_segment() {
        let content = "just some\nprose text\n";
        let segments = split_segments(content);
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], WebSegment::Prose { .. }));
    }

    #[test]
    fn separates_fenced_code_from_surrounding_prose() {
        let content = "intro\n```rust\nfn a() {}\n```\noutro\n";
        let segments = split_segments(content);
        let kinds: Vec<&str> = segments
            .iter()
            .map(|s| match s {
                WebSegment::Code { .. } => "code",
                WebSegment::Prose { .. } => "prose",
            })
            .collect();
        assert_eq!(kinds, vec!["prose", "code", "prose"]);
    }

    #[test]
    fn fence_language_tag_is_normalized() {
        let content = "```ts\nconst x = 1;\n```\n";
        let segments = split_segments(content);
        let WebSegment::Code { language, start_line, end_line, content: code } = &segments[0] else {
            panic!("expected a code segment");
        };
        assert_eq!(language.as_deref(), Some("typescript"));
        assert_eq!(*start_line, 2);
        assert_eq!(*end_line, 2);
        assert_eq!(code, "const x = 1;\n");
    }

    #[test]
    fn unterminated_fence_runs_to_end_of_file() {
        let content = "before\n```\nhalf written code\n";
        let segments = split_segments(content);
        assert!(matches!(segments.last().unwrap(), WebSegment::Code { .. }));
    }

    #[test]
    fn back_to_back_fences_produce_no_empty_prose_between() {
        let content = "```rust\na\n```\n```python\nb\n```\n";
        let segments = split_segments(content);
        let kinds: Vec<&str> = segments
            .iter()
            .map(|s| match s {
                WebSegment::Code { .. } => "code",
                WebSegment::Prose { .. } => "prose",
            })
            .collect();
        assert_eq!(kinds, vec!["code", "code"]);
    }
}
