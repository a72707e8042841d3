//! Terminal presentation of a block sequence.

use console::{style, Style};

use crate::content::blocks::{Block, Span};

/// Renders blocks for the terminal: headings styled and separated, bold spans bold.
pub fn render_blocks(blocks: &[Block]) -> String {
    let h1 = Style::new().bold().blue();
    let h2 = Style::new().bold().dim();
    let mut out = String::new();

    for (i, block) in blocks.iter().enumerate() {
        match block {
            Block::Heading1 { text } => {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&h1.apply_to(text).to_string());
                out.push('\n');
            }
            Block::Heading2 { text } => {
                out.push_str(&h2.apply_to(text).to_string());
                out.push('\n');
            }
            Block::Paragraph { spans } => {
                for span in spans {
                    match span {
                        Span::Plain(t) => out.push_str(t),
                        Span::Bold(t) => out.push_str(&style(t).bold().to_string()),
                    }
                }
                out.push('\n');
            }
        }
    }
    out
}
