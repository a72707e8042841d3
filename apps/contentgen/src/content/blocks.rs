//! Block model and parser for the markdown-lite dialect the model is asked to write.
//!
//! Only three constructs are recognised: `###` headings, `####` sub-headings,
//! and `**bold**` runs inside ordinary lines. Everything else is paragraph text.
//! Every exporter consumes this model, so classification happens exactly once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const HEADING1_MARKER: &str = "###";
const HEADING2_MARKER: &str = "####";

/// Non-greedy `**...**`; the inner text may not contain `**`.
static BOLD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// An inline run of paragraph text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Span {
    Plain(String),
    Bold(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(t) | Span::Bold(t) => t,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Span::Bold(_))
    }
}

/// One structural unit of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading1 { text: String },
    Heading2 { text: String },
    Paragraph { spans: Vec<Span> },
}

/// Parses raw generated text into blocks. Blank lines produce nothing.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Block> {
    if line.trim().is_empty() {
        return None;
    }

    // `####` must be checked before `###`, which is its prefix.
    if let Some(rest) = line.strip_prefix(HEADING2_MARKER) {
        return Some(Block::Heading2 {
            text: rest.trim_start().to_string(),
        });
    }
    if let Some(rest) = line.strip_prefix(HEADING1_MARKER) {
        return Some(Block::Heading1 {
            text: rest.trim_start().to_string(),
        });
    }

    Some(Block::Paragraph {
        spans: parse_spans(line),
    })
}

/// Splits a line into plain and bold spans. An unmatched `**` stays literal.
pub fn parse_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD_RUN.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::Plain(line[last..whole.start()].to_string()));
        }
        spans.push(Span::Bold(inner.as_str().to_string()));
        last = whole.end();
    }
    if last < line.len() {
        spans.push(Span::Plain(line[last..].to_string()));
    }
    spans
}

/// First `Heading1` text, used for document titles and filenames.
pub fn first_heading(blocks: &[Block]) -> Option<&str> {
    blocks.iter().find_map(|b| match b {
        Block::Heading1 { text } => Some(text.as_str()),
        _ => None,
    })
}

/// Serializes blocks back to the markdown-lite dialect, one line per block.
#[cfg(test)]
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            Block::Heading1 { text } => format!("{HEADING1_MARKER} {text}"),
            Block::Heading2 { text } => format!("{HEADING2_MARKER} {text}"),
            Block::Paragraph { spans } => spans
                .iter()
                .map(|s| match s {
                    Span::Plain(t) => t.clone(),
                    Span::Bold(t) => format!("**{t}**"),
                })
                .collect(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(t: &str) -> Span {
        Span::Plain(t.to_string())
    }

    fn bold(t: &str) -> Span {
        Span::Bold(t.to_string())
    }

    #[test]
    fn test_empty_input_yields_no_blocks() {
        assert!(parse_blocks("").is_empty());
    }

    #[test]
    fn test_plain_line_is_single_plain_span() {
        assert_eq!(
            parse_blocks("plain text"),
            vec![Block::Paragraph {
                spans: vec![plain("plain text")]
            }]
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            parse_blocks("### Title"),
            vec![Block::Heading1 {
                text: "Title".to_string()
            }]
        );
        assert_eq!(
            parse_blocks("#### Sub"),
            vec![Block::Heading2 {
                text: "Sub".to_string()
            }]
        );
    }

    #[test]
    fn test_heading_strips_whole_whitespace_run_only() {
        assert_eq!(
            parse_blocks("###   Spaced  title "),
            vec![Block::Heading1 {
                text: "Spaced  title ".to_string()
            }]
        );
        assert_eq!(
            parse_blocks("###NoSpace"),
            vec![Block::Heading1 {
                text: "NoSpace".to_string()
            }]
        );
    }

    #[test]
    fn test_five_hashes_is_heading2() {
        assert_eq!(
            parse_blocks("##### Deep"),
            vec![Block::Heading2 {
                text: "# Deep".to_string()
            }]
        );
    }

    #[test]
    fn test_one_or_two_hashes_is_paragraph() {
        assert_eq!(
            parse_blocks("## Not a heading"),
            vec![Block::Paragraph {
                spans: vec![plain("## Not a heading")]
            }]
        );
    }

    #[test]
    fn test_bold_then_single_asterisks_stay_plain() {
        assert_eq!(
            parse_blocks("**bold** and *not*"),
            vec![Block::Paragraph {
                spans: vec![bold("bold"), plain(" and *not*")]
            }]
        );
    }

    #[test]
    fn test_odd_marker_count_leaves_trailing_marker_literal() {
        assert_eq!(
            parse_spans("a **b** c **d"),
            vec![plain("a "), bold("b"), plain(" c **d")]
        );
    }

    #[test]
    fn test_adjacent_bold_runs_drop_empty_gaps() {
        assert_eq!(parse_spans("**a****b**"), vec![bold("a"), bold("b")]);
    }

    #[test]
    fn test_heading_text_is_not_split_for_bold() {
        assert_eq!(
            parse_blocks("### A **loud** title"),
            vec![Block::Heading1 {
                text: "A **loud** title".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_and_whitespace_lines_are_dropped() {
        let blocks = parse_blocks("first\n\n   \n\t\nsecond\n");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let blocks = parse_blocks("### T\r\nbody\r\n");
        assert_eq!(
            blocks,
            vec![
                Block::Heading1 {
                    text: "T".to_string()
                },
                Block::Paragraph {
                    spans: vec![plain("body")]
                },
            ]
        );
    }

    #[test]
    fn test_span_text_reconstructs_line_without_markers() {
        let line = "Use **Rust** for **speed**, not *hype*.";
        let spans = parse_spans(line);
        let joined: String = spans.iter().map(Span::text).collect();
        assert_eq!(joined, line.replace("**", ""));
    }

    #[test]
    fn test_round_trip_reproduces_input_lines() {
        let input = "### Getting Started\n\
                     Intro with **key point** and trailing text\n\
                     #### Details\n\
                     **Lead:** explanation ** dangling\n\
                     Plain closing line.";
        let blocks = parse_blocks(input);
        assert_eq!(blocks_to_markdown(&blocks), input);
    }

    #[test]
    fn test_first_heading_skips_subheadings() {
        let blocks = parse_blocks("#### Sub\nbody\n### Main\n### Second");
        assert_eq!(first_heading(&blocks), Some("Main"));
        assert_eq!(first_heading(&parse_blocks("just text")), None);
    }
}
