// Layout engine: font metrics, word wrap, and pagination onto fixed-size pages.
// Pure and synchronous. Exporters consume the instruction list it produces.

pub mod font_metrics;
pub mod geometry;
pub mod paginator;
pub mod wrap;

use thiserror::Error;

pub use geometry::{HeaderBand, PageGeometry};
pub use paginator::paginate;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),
}
