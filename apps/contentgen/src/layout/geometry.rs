//! Page geometry for the paginated export.
//!
//! All values are layout units (millimetres). The defaults describe an A4
//! portrait page with a 20mm margin and a 20mm gray header band.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

pub const DEFAULT_HEADER_TITLE: &str = "Smart Content Generator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Left/right margin, also the top offset of the body.
    pub margin: f32,
    /// Space reserved below the top margin for the header band.
    pub header_height: f32,
    /// Lines may not extend below `page_height - bottom_margin`.
    pub bottom_margin: f32,
    /// Height of the filled header band drawn from the top edge.
    pub header_band_height: f32,
    /// Baseline of the header title and date.
    pub header_text_y: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 20.0,
            header_height: 15.0,
            bottom_margin: 25.0,
            header_band_height: 20.0,
            header_text_y: 13.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Vertical cursor position at the top of every page.
    pub fn content_top(&self) -> f32 {
        self.margin + self.header_height
    }

    /// Lowest position a line may reach.
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.bottom_margin
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }

    /// Rejects geometry that leaves no room for text.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let finite = [
            self.page_width,
            self.page_height,
            self.margin,
            self.header_height,
            self.bottom_margin,
            self.header_band_height,
            self.header_text_y,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !finite {
            return Err(LayoutError::InvalidGeometry(
                "geometry values must be finite".to_string(),
            ));
        }
        if self.content_width() <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "content width {} is not positive",
                self.content_width()
            )));
        }
        if self.content_height() <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "content height {} is not positive",
                self.content_height()
            )));
        }
        Ok(())
    }
}

/// Text of the band repeated at the top of every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderBand {
    pub title: String,
    pub date_label: String,
}

impl HeaderBand {
    pub fn new(date_label: impl Into<String>) -> Self {
        Self {
            title: DEFAULT_HEADER_TITLE.to_string(),
            date_label: date_label.into(),
        }
    }

    /// Header dated with the local calendar date.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().format("%m/%d/%Y").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_a4() {
        let g = PageGeometry::default();
        assert!(g.validate().is_ok());
        assert_eq!(g.content_width(), 170.0);
        assert_eq!(g.content_top(), 35.0);
        assert_eq!(g.content_bottom(), 272.0);
    }

    #[test]
    fn test_margins_wider_than_page_are_invalid() {
        let g = PageGeometry {
            margin: 105.0,
            ..PageGeometry::default()
        };
        assert!(matches!(g.validate(), Err(LayoutError::InvalidGeometry(_))));
    }

    #[test]
    fn test_zero_content_height_is_invalid() {
        let g = PageGeometry {
            page_height: 60.0,
            ..PageGeometry::default()
        };
        // top = 35, bottom = 60 - 25 = 35
        assert!(matches!(g.validate(), Err(LayoutError::InvalidGeometry(_))));
    }

    #[test]
    fn test_nan_is_invalid() {
        let g = PageGeometry {
            page_width: f32::NAN,
            ..PageGeometry::default()
        };
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_header_band_uses_fixed_title() {
        let band = HeaderBand::new("10/16/2026");
        assert_eq!(band.title, DEFAULT_HEADER_TITLE);
        assert_eq!(band.date_label, "10/16/2026");
    }
}
