//! Inline span tokenizer for `**bold**` and `` `code` ``

use serde::Serialize;

/// One inline node of a text line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Inline {
    Text(String),
    Bold(String),
    Code(String),
}

const BOLD: &str = "**";
const CODE: &str = "`";

/// Split a line into literal text and styled spans.
///
/// Scans left to right and commits to the first delimiter that has a closer
/// with at least one character between them, consuming through the closer.
/// Spans therefore never overlap, and a delimiter inside a committed span is
/// plain text. Unclosed delimiters stay literal. The result is never empty.
pub fn parse_inline(line: &str) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < line.len() {
        let rest = &line[pos..];
        let span = if rest.starts_with(BOLD) {
            closed_span(line, pos, BOLD).map(|(inner, end)| (Inline::Bold(inner), end))
        } else if rest.starts_with(CODE) {
            closed_span(line, pos, CODE).map(|(inner, end)| (Inline::Code(inner), end))
        } else {
            None
        };

        match span {
            Some((node, end)) => {
                if literal_start < pos {
                    nodes.push(Inline::Text(line[literal_start..pos].to_string()));
                }
                nodes.push(node);
                pos = end;
                literal_start = end;
            }
            None => {
                // Advance one whole character
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if literal_start < line.len() {
        nodes.push(Inline::Text(line[literal_start..].to_string()));
    }

    if nodes.is_empty() {
        nodes.push(Inline::Text(line.to_string()));
    }

    nodes
}

/// Find the closer for a delimiter opening at `open`.
///
/// Returns the inner text and the byte offset just past the closer.
fn closed_span(line: &str, open: usize, delimiter: &str) -> Option<(String, usize)> {
    let inner_start = open + delimiter.len();
    let first = line[inner_start..].chars().next()?;
    let search_from = inner_start + first.len_utf8();
    let close = line[search_from..].find(delimiter)? + search_from;
    Some((
        line[inner_start..close].to_string(),
        close + delimiter.len(),
    ))
}

/// Concatenated visible text, without markup
pub fn plain_text(nodes: &[Inline]) -> String {
    nodes
        .iter()
        .map(|node| match node {
            Inline::Text(s) | Inline::Bold(s) | Inline::Code(s) => s.as_str(),
        })
        .collect()
}
