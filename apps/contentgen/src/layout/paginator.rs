//! Paginator: places blocks on fixed-size pages.
//!
//! # Rules
//! - Heading1: 22pt bold accent, 20 units per line. Breaks the page whenever
//!   body content has already been placed anywhere in the document.
//! - Heading2: 18pt bold secondary, 15 units per line.
//! - Paragraph: 11pt justified, 7 units per line plus 5 after the block.
//!
//! Headings must fit as a whole; paragraphs are checked line by line. A block
//! or line that does not fit on an empty page is placed anyway so the loop
//! always advances.
//!
//! Output is ordered by page, then top-to-bottom, then left-to-right.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::Block;
use crate::layout::font_metrics::FontWeight;
use crate::layout::geometry::{HeaderBand, PageGeometry};
use crate::layout::wrap::{
    justify_spacing, line_runs, words_from_spans, words_from_text, wrap_words, StyledWord,
};
use crate::layout::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size_pt: f32,
    pub weight: FontWeight,
    pub color: Rgb,
}

impl TextStyle {
    pub fn with_weight(self, weight: FontWeight) -> Self {
        Self { weight, ..self }
    }
}

/// Horizontal anchoring. For `Right`, `x` is the right edge of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Justify,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawRole {
    HeaderTitle,
    HeaderDate,
    Heading1,
    Heading2,
    Paragraph,
}

impl DrawRole {
    #[cfg(test)]
    pub fn is_header(self) -> bool {
        matches!(self, DrawRole::HeaderTitle | DrawRole::HeaderDate)
    }
}

/// One piece of text placed on a page. `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    /// 1-based page index.
    pub page: u32,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub style: TextStyle,
    pub align: Align,
    pub role: DrawRole,
    /// Extra space added to every space character of `text`.
    pub word_spacing: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Styles and spacing
// ────────────────────────────────────────────────────────────────────────────

pub const HEADING1_STYLE: TextStyle = TextStyle {
    size_pt: 22.0,
    weight: FontWeight::Bold,
    color: Rgb(30, 64, 175),
};
pub const HEADING2_STYLE: TextStyle = TextStyle {
    size_pt: 18.0,
    weight: FontWeight::Bold,
    color: Rgb(75, 85, 99),
};
pub const PARAGRAPH_STYLE: TextStyle = TextStyle {
    size_pt: 11.0,
    weight: FontWeight::Normal,
    color: Rgb(51, 51, 51),
};
pub const HEADER_STYLE: TextStyle = TextStyle {
    size_pt: 8.0,
    weight: FontWeight::Normal,
    color: Rgb(100, 100, 100),
};
pub const HEADER_FILL: Rgb = Rgb(245, 245, 245);

pub const HEADING1_LINE_SPACING: f32 = 20.0;
pub const HEADING2_LINE_SPACING: f32 = 15.0;
pub const PARAGRAPH_LINE_SPACING: f32 = 7.0;
pub const PARAGRAPH_GAP: f32 = 5.0;

// ────────────────────────────────────────────────────────────────────────────
// Layout state
// ────────────────────────────────────────────────────────────────────────────

struct PageLayout<'a> {
    geometry: &'a PageGeometry,
    header: &'a HeaderBand,
    page: u32,
    y: f32,
    placed_body: bool,
    page_has_body: bool,
    out: Vec<DrawInstruction>,
}

impl<'a> PageLayout<'a> {
    fn new(geometry: &'a PageGeometry, header: &'a HeaderBand) -> Self {
        let mut layout = Self {
            geometry,
            header,
            page: 0,
            y: geometry.content_top(),
            placed_body: false,
            page_has_body: false,
            out: Vec::new(),
        };
        layout.new_page();
        layout
    }

    fn new_page(&mut self) {
        self.page += 1;
        self.y = self.geometry.content_top();
        self.page_has_body = false;

        let g = self.geometry;
        self.out.push(DrawInstruction {
            page: self.page,
            text: self.header.title.clone(),
            x: g.margin,
            y: g.header_text_y,
            style: HEADER_STYLE,
            align: Align::Left,
            role: DrawRole::HeaderTitle,
            word_spacing: 0.0,
        });
        self.out.push(DrawInstruction {
            page: self.page,
            text: self.header.date_label.clone(),
            x: g.page_width - g.margin,
            y: g.header_text_y,
            style: HEADER_STYLE,
            align: Align::Right,
            role: DrawRole::HeaderDate,
            word_spacing: 0.0,
        });
    }

    /// Breaks the page when `needed` would cross the bottom limit, unless the
    /// page is still empty.
    fn ensure_room(&mut self, needed: f32) {
        if self.page_has_body && self.y + needed > self.geometry.content_bottom() {
            debug!("Page {} full at y={:.1}, breaking", self.page, self.y);
            self.new_page();
        }
    }

    fn heading(&mut self, text: &str, style: TextStyle, line_spacing: f32, role: DrawRole) {
        let width = self.geometry.content_width();
        let lines = wrap_words(words_from_text(text, style.weight), width, style.size_pt);

        if role == DrawRole::Heading1 && self.placed_body {
            self.new_page();
        }
        self.ensure_room(line_spacing * lines.len() as f32);

        for line in &lines {
            self.place(DrawInstruction {
                page: self.page,
                text: join_words(line),
                x: self.geometry.margin,
                y: self.y,
                style,
                align: Align::Left,
                role,
                word_spacing: 0.0,
            });
            self.y += line_spacing;
        }
    }

    fn paragraph(&mut self, words: Vec<StyledWord>) {
        let style = PARAGRAPH_STYLE;
        let width = self.geometry.content_width();
        let lines = wrap_words(words, width, style.size_pt);
        let last = lines.len() - 1;

        for (i, line) in lines.iter().enumerate() {
            self.ensure_room(PARAGRAPH_LINE_SPACING);

            let extra = if i < last {
                justify_spacing(line, width, style.size_pt)
            } else {
                0.0
            };
            for run in line_runs(line, self.geometry.margin, style.size_pt, extra) {
                self.place(DrawInstruction {
                    page: self.page,
                    text: run.text,
                    x: run.x,
                    y: self.y,
                    style: style.with_weight(run.weight),
                    align: Align::Justify,
                    role: DrawRole::Paragraph,
                    word_spacing: extra,
                });
            }
            self.y += PARAGRAPH_LINE_SPACING;
        }
        self.y += PARAGRAPH_GAP;
    }

    fn place(&mut self, instruction: DrawInstruction) {
        self.placed_body = true;
        self.page_has_body = true;
        self.out.push(instruction);
    }
}

fn join_words(line: &[StyledWord]) -> String {
    line.iter()
        .map(|w| w.pieces.iter().map(|p| p.text.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `blocks` onto pages described by `geometry`.
///
/// Every page starts with the header band (title left, date right). An empty
/// block list yields a single page holding only the header band.
pub fn paginate(
    blocks: &[Block],
    geometry: &PageGeometry,
    header: &HeaderBand,
) -> Result<Vec<DrawInstruction>, LayoutError> {
    geometry.validate()?;

    let mut layout = PageLayout::new(geometry, header);
    for block in blocks {
        match block {
            Block::Heading1 { text } => {
                layout.heading(text, HEADING1_STYLE, HEADING1_LINE_SPACING, DrawRole::Heading1)
            }
            Block::Heading2 { text } => {
                layout.heading(text, HEADING2_STYLE, HEADING2_LINE_SPACING, DrawRole::Heading2)
            }
            Block::Paragraph { spans } => layout.paragraph(words_from_spans(spans)),
        }
    }

    debug!(
        "Paginated {} blocks onto {} page(s), {} instructions",
        blocks.len(),
        layout.page,
        layout.out.len()
    );
    Ok(layout.out)
}

/// Number of pages referenced by a paginated instruction list.
pub fn page_count(instructions: &[DrawInstruction]) -> u32 {
    instructions.iter().map(|i| i.page).max().unwrap_or(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_blocks;

    /// top = 35, bottom = 70: exactly three single-line paragraphs per page.
    fn make_three_line_geometry() -> PageGeometry {
        PageGeometry {
            page_height: 95.0,
            ..PageGeometry::default()
        }
    }

    fn make_header() -> HeaderBand {
        HeaderBand::new("10/16/2026")
    }

    fn body(instructions: &[DrawInstruction]) -> Vec<&DrawInstruction> {
        instructions.iter().filter(|i| !i.role.is_header()).collect()
    }

    fn lines_on_page(instructions: &[DrawInstruction], page: u32) -> usize {
        let mut ys: Vec<f32> = body(instructions)
            .into_iter()
            .filter(|i| i.page == page)
            .map(|i| i.y)
            .collect();
        ys.dedup();
        ys.len()
    }

    #[test]
    fn test_empty_blocks_yield_single_header_page() {
        let out = paginate(&[], &PageGeometry::default(), &make_header()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].role, DrawRole::HeaderTitle);
        assert_eq!(out[0].text, "Smart Content Generator");
        assert_eq!(out[1].role, DrawRole::HeaderDate);
        assert_eq!(out[1].align, Align::Right);
        assert_eq!(out[1].x, 190.0);
        assert_eq!(page_count(&out), 1);
    }

    #[test]
    fn test_seven_paragraphs_split_three_three_one() {
        let text = (1..=7).map(|i| format!("Line {i}")).collect::<Vec<_>>().join("\n");
        let blocks = parse_blocks(&text);
        let out = paginate(&blocks, &make_three_line_geometry(), &make_header()).unwrap();

        assert_eq!(page_count(&out), 3);
        assert_eq!(lines_on_page(&out, 1), 3);
        assert_eq!(lines_on_page(&out, 2), 3);
        assert_eq!(lines_on_page(&out, 3), 1);

        for page in 1..=3 {
            let first = out.iter().find(|i| i.page == page).unwrap();
            assert_eq!(first.role, DrawRole::HeaderTitle);
        }
        let page2: Vec<_> = body(&out).into_iter().filter(|i| i.page == 2).collect();
        assert_eq!(page2[0].text, "Line 4");
        assert_eq!(page2[0].y, 35.0);
    }

    #[test]
    fn test_paragraph_spacing_advances_cursor() {
        let blocks = parse_blocks("one\ntwo");
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();
        let b = body(&out);
        assert_eq!(b[0].y, 35.0);
        assert_eq!(b[1].y, 35.0 + PARAGRAPH_LINE_SPACING + PARAGRAPH_GAP);
    }

    #[test]
    fn test_first_heading1_does_not_break() {
        let blocks = parse_blocks("### Title\nbody");
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();
        assert_eq!(page_count(&out), 1);
        let b = body(&out);
        assert_eq!(b[0].role, DrawRole::Heading1);
        assert_eq!(b[0].style, HEADING1_STYLE);
        assert_eq!(b[1].y, 35.0 + HEADING1_LINE_SPACING);
    }

    #[test]
    fn test_heading1_after_content_starts_next_page() {
        let blocks = parse_blocks("intro\n### Chapter\nmore");
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();

        assert_eq!(page_count(&out), 2);
        let heading = out.iter().find(|i| i.role == DrawRole::Heading1).unwrap();
        assert_eq!(heading.page, 2);
        assert_eq!(heading.y, 35.0);
    }

    #[test]
    fn test_every_later_heading1_breaks() {
        let blocks = parse_blocks("### A\n### B\n### C");
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();
        let pages: Vec<u32> = body(&out).iter().map(|i| i.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn test_heading2_never_forces_break() {
        let blocks = parse_blocks("intro\n#### Section\nmore");
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();
        assert_eq!(page_count(&out), 1);
        let h2 = out.iter().find(|i| i.role == DrawRole::Heading2).unwrap();
        assert_eq!(h2.style.color, Rgb(75, 85, 99));
    }

    #[test]
    fn test_heading2_moves_when_it_does_not_fit() {
        // Two paragraphs leave y = 59; 59 + 15 > 70.
        let blocks = parse_blocks("one\ntwo\n#### Next");
        let out = paginate(&blocks, &make_three_line_geometry(), &make_header()).unwrap();
        let h2 = out.iter().find(|i| i.role == DrawRole::Heading2).unwrap();
        assert_eq!(h2.page, 2);
    }

    #[test]
    fn test_oversized_heading_on_empty_page_is_placed() {
        let geometry = PageGeometry {
            page_height: 70.0,
            ..PageGeometry::default()
        };
        // top 35, bottom 45: a 20-unit heading never fits.
        let blocks = parse_blocks("### Big\n### Bigger");
        let out = paginate(&blocks, &geometry, &make_header()).unwrap();
        let pages: Vec<u32> = body(&out).iter().map(|i| i.page).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[test]
    fn test_long_paragraph_is_justified_except_last_line() {
        let words = vec!["lorem"; 80].join(" ");
        let blocks = parse_blocks(&words);
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();
        let b = body(&out);

        assert!(b.len() > 1);
        assert!(b[0].word_spacing > 0.0);
        assert_eq!(b[0].align, Align::Justify);
        assert_eq!(b.last().unwrap().word_spacing, 0.0);
        for line in &b[..b.len() - 1] {
            assert!(line.word_spacing >= 0.0);
        }
    }

    #[test]
    fn test_wrapped_paragraph_continues_on_next_page() {
        let words = vec!["lorem"; 150].join(" ");
        let geometry = make_three_line_geometry();
        let out = paginate(&parse_blocks(&words), &geometry, &make_header()).unwrap();

        let ys_on = |page: u32| {
            let mut ys: Vec<f32> = body(&out)
                .into_iter()
                .filter(|i| i.page == page)
                .map(|i| i.y)
                .collect();
            ys.dedup();
            ys
        };

        assert_eq!(ys_on(1), vec![35.0, 42.0, 49.0, 56.0, 63.0]);
        let page2 = ys_on(2);
        assert!(page2.len() > 1);
        assert_eq!(page2[0], geometry.content_top());
        for pair in page2.windows(2) {
            assert!((pair[1] - pair[0] - PARAGRAPH_LINE_SPACING).abs() < 1e-4);
        }
        assert!(out
            .iter()
            .any(|i| i.page == 2 && i.role == DrawRole::HeaderTitle));
        assert!(out
            .iter()
            .any(|i| i.page == 2 && i.role == DrawRole::HeaderDate));
    }

    #[test]
    fn test_bold_span_emits_separate_run() {
        let blocks = parse_blocks("Some **bold** text");
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();
        let b = body(&out);

        assert_eq!(b.len(), 3);
        assert_eq!(b[1].style.weight, FontWeight::Bold);
        assert_eq!(b[1].text.trim(), "bold");
        assert!(b[0].x < b[1].x && b[1].x < b[2].x);
        assert!(b.iter().all(|i| i.y == b[0].y));
    }

    #[test]
    fn test_every_block_yields_an_instruction() {
        let blocks = vec![Block::Heading1 { text: String::new() }];
        let out = paginate(&blocks, &PageGeometry::default(), &make_header()).unwrap();
        assert_eq!(body(&out).len(), 1);
    }

    #[test]
    fn test_pages_are_contiguous_and_non_decreasing() {
        let text = "### A\npara\n#### B\n".repeat(20);
        let blocks = parse_blocks(&text);
        let out = paginate(&blocks, &make_three_line_geometry(), &make_header()).unwrap();
        let mut last = 1;
        for i in &out {
            assert!(i.page == last || i.page == last + 1);
            last = i.page;
        }
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        let geometry = PageGeometry {
            margin: 200.0,
            ..PageGeometry::default()
        };
        let err = paginate(&parse_blocks("x"), &geometry, &make_header()).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidGeometry(_)));
    }
}
