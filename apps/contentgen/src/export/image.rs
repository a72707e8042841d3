//! PNG snapshot of the preview.
//!
//! The preview is a single unpaginated column laid out with the same metrics,
//! sizes and spacing as the PDF, so lines break in the same places. Glyphs
//! come from an embedded DejaVu Sans Condensed pair and are centred in the
//! Helvetica advance of the character they stand for.
//!
//! Capturing goes through a [`SurfaceLease`]; only one capture may hold the
//! surface at a time and the lease is released when it drops, whether the
//! capture succeeded or not.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};

use ab_glyph::{point, Font, FontRef, PxScale, ScaleFont};
use chrono::{DateTime, Utc};
use image::{ImageBuffer, ImageFormat, Rgb as Pixel, RgbImage};
use tracing::debug;

use crate::content::blocks::Block;
use crate::errors::AppError;
use crate::export::{timestamp_filename, Artifact, ExportError, ExportFormat};
use crate::layout::font_metrics::{get_metrics, win_ansi_code, FontWeight, PT_TO_UNITS};
use crate::layout::paginator::{
    Rgb, TextStyle, HEADING1_LINE_SPACING, HEADING1_STYLE, HEADING2_LINE_SPACING, HEADING2_STYLE,
    PARAGRAPH_GAP, PARAGRAPH_LINE_SPACING, PARAGRAPH_STYLE,
};
use crate::layout::wrap::{
    justify_spacing, line_runs, words_from_spans, words_from_text, wrap_words, Run,
};
use crate::layout::PageGeometry;

static SANS: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansCondensed.ttf");
static SANS_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansCondensed-Bold.ttf");

/// CSS pixels per layout unit (96 dpi).
const PX_PER_UNIT: f32 = 96.0 / 25.4;
/// Device pixel ratio of the capture.
pub const CAPTURE_SCALE: f32 = 2.0;
/// Pixel budget of one capture. Content that would exceed it at the
/// requested scale is captured at a smaller scale instead.
pub const MAX_CAPTURE_PIXELS: u64 = 16_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn background(self) -> Rgb {
        match self {
            Theme::Light => Rgb(0xff, 0xff, 0xff),
            Theme::Dark => Rgb(0x1a, 0x1a, 0x1a),
        }
    }

    /// Text color for `style` on this theme's background.
    fn ink(self, style: &TextStyle) -> Rgb {
        match self {
            Theme::Light => style.color,
            Theme::Dark if style.color == HEADING1_STYLE.color => Rgb(96, 165, 250),
            Theme::Dark if style.color == HEADING2_STYLE.color => Rgb(209, 213, 219),
            Theme::Dark => Rgb(229, 231, 235),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Faces
// ────────────────────────────────────────────────────────────────────────────

struct Faces {
    regular: FontRef<'static>,
    bold: FontRef<'static>,
}

impl Faces {
    fn load() -> Result<Self, ExportError> {
        let parse = |data: &'static [u8]| {
            FontRef::try_from_slice(data)
                .map_err(|e| ExportError::Surface(format!("embedded font is unreadable: {e}")))
        };
        Ok(Self {
            regular: parse(SANS)?,
            bold: parse(SANS_BOLD)?,
        })
    }

    fn get(&self, weight: FontWeight) -> &FontRef<'static> {
        match weight {
            FontWeight::Normal => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// `PxScale` whose em square is `em_px` pixels tall.
fn em_scale(font: &FontRef<'_>, em_px: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(em_px * font.height_unscaled() / units_per_em)
}

// ────────────────────────────────────────────────────────────────────────────
// Snapshot surface
// ────────────────────────────────────────────────────────────────────────────

/// The rendered preview that image export captures.
pub struct SnapshotSurface {
    blocks: Vec<Block>,
    theme: Theme,
    geometry: PageGeometry,
    leased: AtomicBool,
}

impl SnapshotSurface {
    pub fn new(blocks: Vec<Block>, theme: Theme, geometry: PageGeometry) -> Self {
        Self {
            blocks,
            theme,
            geometry,
            leased: AtomicBool::new(false),
        }
    }

    /// Takes exclusive use of the surface until the lease drops.
    pub fn acquire(&self) -> Result<SurfaceLease<'_>, ExportError> {
        self.leased
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Surface("a capture is already in progress".to_string()))?;
        debug!("Snapshot surface acquired");
        Ok(SurfaceLease { surface: self })
    }

    #[cfg(test)]
    pub fn is_leased(&self) -> bool {
        self.leased.load(Ordering::Acquire)
    }
}

pub struct SurfaceLease<'a> {
    surface: &'a SnapshotSurface,
}

impl SurfaceLease<'_> {
    /// Rasterizes the surface at up to `scale` device pixels per CSS pixel.
    ///
    /// The scale is lowered when the capture would exceed
    /// [`MAX_CAPTURE_PIXELS`]; content is never cut off.
    pub fn capture(&self, scale: f32) -> Result<RgbImage, ExportError> {
        let s = self.surface;
        let column = layout_column(&s.blocks, &s.geometry);
        let width_units = s.geometry.page_width;
        let height_units = column.height + s.geometry.margin;

        let scale = fit_scale(scale, width_units, height_units, MAX_CAPTURE_PIXELS);
        let px = PX_PER_UNIT * scale;
        let width = (width_units * px).ceil() as u32;
        let height = (height_units * px).ceil() as u32;
        if width == 0 || height == 0 {
            return Err(ExportError::Encode {
                format: ExportFormat::Png,
                message: format!("capture size {width}x{height} is empty"),
            });
        }

        let faces = Faces::load()?;
        let bg = s.theme.background();
        let mut img: RgbImage = ImageBuffer::from_pixel(width, height, Pixel([bg.0, bg.1, bg.2]));
        for line in &column.lines {
            draw_text(&mut img, &faces, line, s.theme.ink(&line.style), px);
        }
        Ok(img)
    }
}

impl Drop for SurfaceLease<'_> {
    fn drop(&mut self) {
        self.surface.leased.store(false, Ordering::Release);
        debug!("Snapshot surface released");
    }
}

/// Largest scale not above `requested` whose capture fits in `max_pixels`.
fn fit_scale(requested: f32, width_units: f32, height_units: f32, max_pixels: u64) -> f32 {
    let area_at_one = (width_units * PX_PER_UNIT) * (height_units * PX_PER_UNIT);
    if area_at_one <= 0.0 || !area_at_one.is_finite() {
        return requested;
    }
    // Headroom for rounding each side up to a whole pixel.
    let budget = max_pixels as f32 * 0.99;
    let fitted = (budget / area_at_one).sqrt();
    if fitted < requested {
        debug!("Capture too large at {requested}x, using {fitted:.3}x");
        fitted
    } else {
        requested
    }
}

/// Draws one run glyph by glyph, each centred in its Helvetica advance.
fn draw_text(img: &mut RgbImage, faces: &Faces, text: &PlacedText, ink: Rgb, px: f32) {
    let metrics = get_metrics(text.style.weight);
    let font = faces.get(text.style.weight);
    let em_px = text.style.size_pt * PT_TO_UNITS * px;
    let scale = em_scale(font, em_px);
    let scaled = font.as_scaled(scale);
    let baseline = text.baseline * px;

    let mut cell_x = text.x * px;
    for c in text.text.chars() {
        let shown = if win_ansi_code(c).is_some() { c } else { '?' };
        let mut buf = [0u8; 4];
        let mut cell_w = metrics.text_width(shown.encode_utf8(&mut buf), text.style.size_pt) * px;
        if c == ' ' {
            cell_w += text.word_spacing * px;
        }

        let id = font.glyph_id(shown);
        let offset = (cell_w - scaled.h_advance(id)) / 2.0;
        let glyph = id.with_scale_and_position(scale, point(cell_x + offset.max(0.0), baseline));
        if let Some(outline) = font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                    blend(img.get_pixel_mut(x as u32, y as u32), ink, coverage);
                }
            });
        }
        cell_x += cell_w;
    }
}

fn blend(pixel: &mut Pixel<u8>, ink: Rgb, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    let mix = |bg: u8, fg: u8| (bg as f32 * (1.0 - a) + fg as f32 * a).round() as u8;
    *pixel = Pixel([
        mix(pixel.0[0], ink.0),
        mix(pixel.0[1], ink.1),
        mix(pixel.0[2], ink.2),
    ]);
}

// ────────────────────────────────────────────────────────────────────────────
// Column layout
// ────────────────────────────────────────────────────────────────────────────

/// One run of text placed in the column. `baseline` and `x` are layout units.
struct PlacedText {
    text: String,
    x: f32,
    baseline: f32,
    style: TextStyle,
    word_spacing: f32,
}

struct Column {
    lines: Vec<PlacedText>,
    /// Cursor position after the last block.
    height: f32,
}

/// Lays blocks out top to bottom without page breaks.
fn layout_column(blocks: &[Block], geometry: &PageGeometry) -> Column {
    let width = geometry.content_width();
    let x0 = geometry.margin;
    let mut y = geometry.margin;
    let mut lines = Vec::new();

    let mut push_runs = |runs: Vec<Run>, style: TextStyle, y: f32, extra: f32| {
        for run in runs {
            if run.text.trim().is_empty() {
                continue;
            }
            lines.push(PlacedText {
                style: style.with_weight(run.weight),
                text: run.text,
                x: run.x,
                baseline: y,
                word_spacing: extra,
            });
        }
    };

    for block in blocks {
        match block {
            Block::Heading1 { text } | Block::Heading2 { text } => {
                let (style, spacing) = if matches!(block, Block::Heading1 { .. }) {
                    (HEADING1_STYLE, HEADING1_LINE_SPACING)
                } else {
                    (HEADING2_STYLE, HEADING2_LINE_SPACING)
                };
                let wrapped = wrap_words(words_from_text(text, style.weight), width, style.size_pt);
                for line in &wrapped {
                    y += spacing;
                    push_runs(line_runs(line, x0, style.size_pt, 0.0), style, y, 0.0);
                }
            }
            Block::Paragraph { spans } => {
                let style = PARAGRAPH_STYLE;
                let wrapped = wrap_words(words_from_spans(spans), width, style.size_pt);
                let last = wrapped.len() - 1;
                for (i, line) in wrapped.iter().enumerate() {
                    let extra = if i < last {
                        justify_spacing(line, width, style.size_pt)
                    } else {
                        0.0
                    };
                    y += PARAGRAPH_LINE_SPACING;
                    push_runs(line_runs(line, x0, style.size_pt, extra), style, y, extra);
                }
                y += PARAGRAPH_GAP;
            }
        }
    }

    Column { lines, height: y }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Captures `surface` at 2× and encodes it as PNG.
pub fn export_png(surface: &SnapshotSurface, now: DateTime<Utc>) -> Result<Artifact, AppError> {
    let lease = surface.acquire()?;
    let img = lease.capture(CAPTURE_SCALE)?;
    drop(lease);

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExportError::Encode {
            format: ExportFormat::Png,
            message: e.to_string(),
        })?;

    debug!("Captured {}x{} image, {} bytes", img.width(), img.height(), bytes.len());
    Ok(Artifact {
        format: ExportFormat::Png,
        filename: timestamp_filename(now),
        bytes,
    })
}
