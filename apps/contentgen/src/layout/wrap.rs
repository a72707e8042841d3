//! Greedy word wrap over mixed-weight text.
//!
//! A word is a maximal run of non-whitespace characters. Because bold spans
//! can start or end mid-word (`**bold**,`), a word is stored as weighted
//! pieces and measured piece by piece.

use crate::content::Span;
use crate::layout::font_metrics::{get_metrics, FontWeight};

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub text: String,
    pub weight: FontWeight,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledWord {
    pub pieces: Vec<Piece>,
}

impl StyledWord {
    fn push(&mut self, c: char, weight: FontWeight) {
        match self.pieces.last_mut() {
            Some(last) if last.weight == weight => last.text.push(c),
            _ => self.pieces.push(Piece {
                text: c.to_string(),
                weight,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn width(&self, size_pt: f32) -> f32 {
        self.pieces
            .iter()
            .map(|p| get_metrics(p.weight).text_width(&p.text, size_pt))
            .sum()
    }
}

/// A run of same-weight text placed at `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub x: f32,
    pub weight: FontWeight,
}

/// Splits paragraph spans into words, keeping the weight of every character.
pub fn words_from_spans(spans: &[Span]) -> Vec<StyledWord> {
    let mut words = Vec::new();
    let mut current = StyledWord::default();

    for span in spans {
        let weight = FontWeight::from_bold(span.is_bold());
        for c in span.text().chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else {
                current.push(c, weight);
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Words of single-weight text such as a heading.
pub fn words_from_text(text: &str, weight: FontWeight) -> Vec<StyledWord> {
    text.split_whitespace()
        .map(|w| StyledWord {
            pieces: vec![Piece {
                text: w.to_string(),
                weight,
            }],
        })
        .collect()
}

/// Inter-word gap at `size_pt`. Both faces share the same space width.
pub fn space_width(size_pt: f32) -> f32 {
    get_metrics(FontWeight::Normal).space_units(size_pt)
}

/// Natural width of a line of words separated by single spaces.
pub fn line_width(words: &[StyledWord], size_pt: f32) -> f32 {
    let gaps = words.len().saturating_sub(1) as f32;
    words.iter().map(|w| w.width(size_pt)).sum::<f32>() + gaps * space_width(size_pt)
}

/// Greedy wrap to `max_width`. Always returns at least one (possibly empty)
/// line; a word wider than `max_width` sits alone on its line.
pub fn wrap_words(words: Vec<StyledWord>, max_width: f32, size_pt: f32) -> Vec<Vec<StyledWord>> {
    let space = space_width(size_pt);
    let mut lines: Vec<Vec<StyledWord>> = Vec::new();
    let mut current: Vec<StyledWord> = Vec::new();
    let mut current_width = 0.0_f32;

    for word in words {
        let word_w = word.width(size_pt);
        if !current.is_empty() && current_width + space + word_w > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current_width += space;
        }
        current_width += word_w;
        current.push(word);
    }
    lines.push(current);
    lines
}

/// Extra space per gap that stretches `line` to exactly `max_width`.
/// Zero for single-word lines and lines that already overflow.
pub fn justify_spacing(line: &[StyledWord], max_width: f32, size_pt: f32) -> f32 {
    if line.len() < 2 {
        return 0.0;
    }
    let slack = max_width - line_width(line, size_pt);
    if slack <= 0.0 {
        return 0.0;
    }
    slack / (line.len() - 1) as f32
}

/// Lays out one wrapped line as same-weight runs starting at `x0`.
///
/// Each gap is a literal space appended to the run before it, so the renderer's
/// word spacing applies to it; run x positions already include `extra_spacing`.
pub fn line_runs(line: &[StyledWord], x0: f32, size_pt: f32, extra_spacing: f32) -> Vec<Run> {
    let space = space_width(size_pt);
    let mut runs: Vec<Run> = Vec::new();
    let mut x = x0;

    for (i, word) in line.iter().enumerate() {
        if i > 0 {
            if let Some(last) = runs.last_mut() {
                last.text.push(' ');
            }
            x += space + extra_spacing;
        }
        for piece in &word.pieces {
            match runs.last_mut() {
                Some(last) if last.weight == piece.weight => last.text.push_str(&piece.text),
                _ => runs.push(Run {
                    text: piece.text.clone(),
                    x,
                    weight: piece.weight,
                }),
            }
            x += get_metrics(piece.weight).text_width(&piece.text, size_pt);
        }
    }

    if runs.is_empty() {
        runs.push(Run {
            text: String::new(),
            x: x0,
            weight: FontWeight::Normal,
        });
    }
    runs
}
