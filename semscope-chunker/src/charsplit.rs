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

//! Character-based fallback splitter (§4.3): fixed target size with
//! overlap, exact line-number preservation.

/// One window: `(content, start_line, end_line)`, both 1-based inclusive.
pub type CharSpan = (String, u32, u32);

/// Splits `content` into overlapping windows of about `target` characters,
/// each overlapping the previous by about `overlap` characters, measured
/// at line granularity so line numbers stay exact.
///
/// Always makes progress: the next window starts at least one line after
/// the previous window's start, even when `overlap >= target`.
pub fn split_by_chars(content: &str, target: usize, overlap: usize) -> Vec<CharSpan> {
    if content.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut spans = Vec::new();
    let mut start_idx = 0usize;

    while start_idx < lines.len() {
        let mut end_idx = start_idx;
        let mut char_count = 0usize;
        while end_idx < lines.len() && (char_count < target || end_idx == start_idx) {
            char_count += lines[end_idx].chars().count();
            end_idx += 1;
        }

        let text: String = lines[start_idx..end_idx].concat();
        let start_line = (start_idx + 1) as u32;
        let end_line = end_idx as u32;
        spans.push((text, start_line, end_line));

        if end_idx >= lines.len() {
            break;
        }

        let mut back = end_idx;
        let mut overlap_count = 0usize;
        while back > start_idx + 1 && overlap_count < overlap {
            back -= 1;
            overlap_count += lines[back].chars().count();
        }
        start_idx = back.max(start_idx + 1);
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_spans() {
        assert!(split_by_chars("", 1000, 100).is_empty());
    }

    #[test]
    fn short_input_is_a_single_span() {
        let content = "fn main() {}\n";
        let spans = split_by_chars(content, 1000, 100);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0], (content.to_string(), 1, 1));
    }

    #[test]
    fn line_numbers_are_exact_and_contiguous() {
        let content: String = (1..=500).map(|i| format!("line {i}\n")).collect();
        let spans = split_by_chars(&content, 200, 20);
        assert!(spans.len() > 1);
        for (text, start, end) in &spans {
            let expected_lines = (end - start + 1) as usize;
            assert_eq!(text.lines().count(), expected_lines);
        }
    }

    #[test]
    fn overlap_reuses_trailing_lines() {
        let content: String = (1..=50).map(|i| format!("{i:03}\n")).collect();
        let spans = split_by_chars(&content, 40, 20);
        assert!(spans.len() >= 2);
        for w in spans.windows(2) {
            let (_, _, prev_end) = w[0];
            let (_, next_start, _) = w[1];
            assert!(next_start <= prev_end, "window should overlap: {next_start} <= {prev_end}");
        }
    }

    #[test]
    fn always_makes_progress_even_with_overlap_ge_target() {
        let content: String = (1..=10).map(|i| format!("{i}\n")).collect();
        let spans = split_by_chars(&content, 1, 1000);
        assert!(spans.len() >= 10);
        let starts: Vec<u32> = spans.iter().map(|(_, s, _)| *s).collect();
        for w in starts.windows(2) {
            assert!(w[1] > w[0]);
        }
    }
}
