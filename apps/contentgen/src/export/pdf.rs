//! PDF exporter. Turns paginator output into a lopdf document.
//!
//! Layout units are millimetres measured from the top-left corner; PDF user
//! space is points measured from the bottom-left, so every coordinate goes
//! through [`to_pt`] and y is flipped against the page height.
//!
//! Text is set in the base-14 Helvetica faces with WinAnsi encoding, which
//! keeps the file self-contained and matches the widths the wrapper measured.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::content::blocks::Block;
use crate::errors::AppError;
use crate::export::{dated_filename, Artifact, ExportError, ExportFormat};
use crate::layout::font_metrics::{get_metrics, win_ansi_code, FontWeight, PT_TO_UNITS};
use crate::layout::paginator::{page_count, Align, DrawInstruction, Rgb, HEADER_FILL};
use crate::layout::{paginate, HeaderBand, PageGeometry};

const AUTHOR: &str = "Content Generator";
const CREATOR: &str = "Smart Content Generator";
const SUBJECT: &str = "Generated Content";
const KEYWORDS: &str = "ai generated, content, article";

fn to_pt(units: f32) -> f32 {
    units / PT_TO_UNITS
}

fn font_key(weight: FontWeight) -> &'static str {
    match weight {
        FontWeight::Normal => "F1",
        FontWeight::Bold => "F2",
    }
}

fn color_operands(c: Rgb) -> Vec<Object> {
    vec![
        (c.0 as f32 / 255.0).into(),
        (c.1 as f32 / 255.0).into(),
        (c.2 as f32 / 255.0).into(),
    ]
}

/// Maps text to WinAnsi bytes. Characters the encoding lacks become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_code(c).unwrap_or(b'?'))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Document builder
// ────────────────────────────────────────────────────────────────────────────

struct PdfBuilder<'a> {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    geometry: &'a PageGeometry,
}

impl<'a> PdfBuilder<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for weight in [FontWeight::Normal, FontWeight::Bold] {
            let font_id = document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => weight.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font_key(weight), font_id);
        }
        let resources_id = document.add_object(dictionary! { "Font" => fonts });

        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            geometry,
        }
    }

    fn add_page(&mut self, instructions: &[&DrawInstruction]) -> Result<(), lopdf::Error> {
        let g = self.geometry;
        let page_h = to_pt(g.page_height);
        let mut ops: Vec<Operation> = Vec::new();

        // Header band
        ops.push(Operation::new("rg", color_operands(HEADER_FILL)));
        ops.push(Operation::new(
            "re",
            vec![
                0.into(),
                (page_h - to_pt(g.header_band_height)).into(),
                to_pt(g.page_width).into(),
                to_pt(g.header_band_height).into(),
            ],
        ));
        ops.push(Operation::new("f", vec![]));

        for ins in instructions {
            let metrics = get_metrics(ins.style.weight);
            let x = match ins.align {
                Align::Right => ins.x - metrics.text_width(&ins.text, ins.style.size_pt),
                Align::Left | Align::Justify => ins.x,
            };

            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![font_key(ins.style.weight).into(), ins.style.size_pt.into()],
            ));
            ops.push(Operation::new("rg", color_operands(ins.style.color)));
            ops.push(Operation::new("Tw", vec![to_pt(ins.word_spacing).into()]));
            ops.push(Operation::new(
                "Td",
                vec![to_pt(x).into(), (page_h - to_pt(ins.y)).into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&ins.text))],
            ));
            ops.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations: ops };
        let content_id = self
            .document
            .add_object(Stream::new(lopdf::Dictionary::new(), content.encode()?));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), to_pt(g.page_width).into(), page_h.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(mut self, title: &str) -> Result<Vec<u8>, ExportError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let count = self.page_ids.len() as i64;
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(title)),
            "Author" => Object::string_literal(AUTHOR),
            "Creator" => Object::string_literal(CREATOR),
            "Subject" => Object::string_literal(SUBJECT),
            "Keywords" => Object::string_literal(KEYWORDS),
        });
        self.document.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(|e| ExportError::Encode {
                format: ExportFormat::Pdf,
                message: e.to_string(),
            })?;
        Ok(bytes)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Paginates `blocks` and renders one PDF page per page index.
pub fn export_pdf(
    blocks: &[Block],
    geometry: &PageGeometry,
    header: &HeaderBand,
    date: NaiveDate,
) -> Result<Artifact, AppError> {
    let instructions = paginate(blocks, geometry, header)?;
    let encode_err = |message: String| ExportError::Encode {
        format: ExportFormat::Pdf,
        message,
    };

    let mut pages: BTreeMap<u32, Vec<&DrawInstruction>> = BTreeMap::new();
    for ins in &instructions {
        pages.entry(ins.page).or_default().push(ins);
    }

    let mut builder = PdfBuilder::new(geometry);
    for page in pages.values() {
        builder
            .add_page(page)
            .map_err(|e| encode_err(e.to_string()))?;
    }

    let filename = dated_filename(blocks, date, ExportFormat::Pdf);
    let title = filename.trim_end_matches(".pdf");
    let bytes = builder.finish(title)?;

    debug!(
        "Rendered {} PDF page(s), {} bytes",
        page_count(&instructions),
        bytes.len()
    );
    Ok(Artifact {
        format: ExportFormat::Pdf,
        filename,
        bytes,
    })
}
