// Exporters: styled-markup document, paginated PDF, and PNG snapshot.
// Each exporter builds an in-memory `Artifact`; `write_artifact` puts it on disk.

pub mod doc;
pub mod image;
pub mod pdf;

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::content::blocks::{first_heading, Block};

const DEFAULT_SLUG: &str = "generated-content";
const MAX_SLUG_CHARS: usize = 50;

static NON_SLUG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Doc,
    Pdf,
    Png,
}

impl ExportFormat {
    /// Human name used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Doc => "Word document",
            ExportFormat::Pdf => "PDF file",
            ExportFormat::Png => "image",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Doc => "doc",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Doc => "application/msword;charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not encode {}: {message}", .format.label())]
    Encode {
        format: ExportFormat,
        message: String,
    },

    #[error("could not write {}: {source}", .format.label())]
    Io {
        format: ExportFormat,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot surface unavailable: {0}")]
    Surface(String),
}

impl ExportError {
    /// What the user was trying to save.
    pub fn target(&self) -> &'static str {
        match self {
            ExportError::Encode { format, .. } | ExportError::Io { format, .. } => format.label(),
            ExportError::Surface(_) => ExportFormat::Png.label(),
        }
    }
}

/// A rendered export, ready to be written.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: ExportFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Filenames
// ────────────────────────────────────────────────────────────────────────────

/// Slug from the first Heading1: lower-cased, non `[a-z0-9]` runs collapsed
/// to `-`, at most 50 characters. Falls back to `generated-content`.
pub fn slug_for(blocks: &[Block]) -> String {
    let Some(title) = first_heading(blocks) else {
        return DEFAULT_SLUG.to_string();
    };
    let lowered = title.trim().to_lowercase();
    let slug: String = NON_SLUG_RUN
        .replace_all(&lowered, "-")
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect();
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

/// `<slug>-<YYYY-MM-DD>.<ext>` for the text exports.
pub fn dated_filename(blocks: &[Block], date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{}-{}.{}",
        slug_for(blocks),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// `content-<timestamp>.png`, timestamp in RFC 3339 UTC with `:` and `.` as `-`.
pub fn timestamp_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("content-{stamp}.{}", ExportFormat::Png.extension())
}

// ────────────────────────────────────────────────────────────────────────────
// Writing
// ────────────────────────────────────────────────────────────────────────────

/// Writes `artifact` into `dir` atomically: a temp file in the same directory
/// is filled and then persisted under the final name.
pub fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<PathBuf, ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        format: artifact.format,
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&artifact.bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;

    let path = dir.join(&artifact.filename);
    tmp.persist(&path).map_err(|e| io_err(e.error))?;

    info!(
        "Saved {} ({}, {} bytes) to {}",
        artifact.format.label(),
        artifact.mime(),
        artifact.bytes.len(),
        path.display()
    );
    Ok(path)
}
