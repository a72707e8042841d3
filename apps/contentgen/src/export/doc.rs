//! Word-compatible export: an HTML document with embedded styles, prefixed
//! with a UTF-8 BOM so word processors pick the right encoding.

use chrono::NaiveDate;

use crate::content::blocks::{Block, Span};
use crate::export::{dated_filename, Artifact, ExportFormat};

const BOM: &str = "\u{feff}";

const STYLES: &str = r#"<style>
  body { font-family: 'Arial', sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }
  h1 { font-size: 28px; font-weight: bold; color: #1a1a1a; margin: 30px 0 20px; border-bottom: 2px solid #eee; padding-bottom: 10px; }
  h2 { font-size: 22px; font-weight: bold; color: #333; margin: 25px 0 15px; }
  .paragraph { margin-bottom: 15px; color: #333; text-align: justify; }
  .bold { font-weight: bold; }
</style>"#;

/// Renders blocks as a styled HTML document.
pub fn render_html(blocks: &[Block]) -> String {
    let body = blocks
        .iter()
        .map(|block| match block {
            Block::Heading1 { text } => format!("<h1>{}</h1>", escape_html(text)),
            Block::Heading2 { text } => format!("<h2>{}</h2>", escape_html(text)),
            Block::Paragraph { spans } => {
                let inner: String = spans
                    .iter()
                    .map(|span| match span {
                        Span::Plain(t) => escape_html(t),
                        Span::Bold(t) => format!(r#"<span class="bold">{}</span>"#, escape_html(t)),
                    })
                    .collect();
                format!(r#"<div class="paragraph">{inner}</div>"#)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n{STYLES}\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub fn export_doc(blocks: &[Block], date: NaiveDate) -> Artifact {
    let mut bytes = BOM.as_bytes().to_vec();
    bytes.extend_from_slice(render_html(blocks).as_bytes());
    Artifact {
        format: ExportFormat::Doc,
        filename: dated_filename(blocks, date, ExportFormat::Doc),
        bytes,
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_blocks;

    fn make_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_blocks_map_to_tags() {
        let html = render_html(&parse_blocks("### Title\n#### Sub\nSome **bold** text"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<h2>Sub</h2>"));
        assert!(html.contains(
            r#"<div class="paragraph">Some <span class="bold">bold</span> text</div>"#
        ));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_html(&parse_blocks("a <script> & \"b\""));
        assert!(html.contains("a &lt;script&gt; &amp; &quot;b&quot;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_artifact_starts_with_bom() {
        let artifact = export_doc(&parse_blocks("### Notes"), make_date());
        assert!(artifact.bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(artifact.filename, "notes-2026-10-16.doc");
        assert_eq!(artifact.mime(), "application/msword;charset=utf-8");
    }

    #[test]
    fn test_empty_blocks_still_produce_document() {
        let html = render_html(&[]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<body>\n\n</body>"));
    }
}
